use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, TellerError};

/// Top-level configuration for the Teller application.
///
/// Loaded from `teller.toml` by default. Each section corresponds to one
/// backend integration or cross-cutting concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TellerConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub dialogue: DialogueConfig,
    #[serde(default)]
    pub intent: IntentServiceConfig,
    #[serde(default)]
    pub search: SearchServiceConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl TellerConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TellerConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| TellerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Routing policy constants.
///
/// These are policy values, not computed quantities; tune them here rather
/// than changing the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Intent-service confidence below this is a miss.
    pub confidence_threshold: f32,
    /// Fixed confidence stamped on every knowledge-search reply.
    pub search_confidence: f32,
    /// The intent service's designated unrecognized-intent label.
    pub fallback_intent: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.60,
            search_confidence: 0.90,
            fallback_intent: "Fallback".to_string(),
        }
    }
}

/// Dialogue-management engine connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Base URL of the dialogue engine's detect-intent endpoint.
    pub endpoint: String,
    /// Agent identifier within the dialogue engine.
    pub agent_id: String,
    /// BCP-47 language code sent with each query.
    pub language: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8081".to_string(),
            agent_id: "teller-demo".to_string(),
            language: "en".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Managed intent-recognition service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentServiceConfig {
    /// Base URL of the recognize-text endpoint.
    pub endpoint: String,
    /// Bot identifier within the service.
    pub bot_id: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for IntentServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8082".to_string(),
            bot_id: "teller-support".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Document search / knowledge retrieval connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchServiceConfig {
    /// Base URL of the query endpoint.
    pub endpoint: String,
    /// Search index identifier.
    pub index_id: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SearchServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8083".to_string(),
            index_id: "teller-kb".to_string(),
            timeout_secs: 15,
        }
    }
}

/// HTTP API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Port the axum server binds to (localhost only).
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: 3030 }
    }
}
