//! Core types and value objects shared across the routing pipeline.
//!
//! Defines message categories, reply sources, the normalized reply shape,
//! conversation contexts, and the tagged parameter-value decoder.

use std::collections::HashMap;
use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// Coarse message category assigned by the keyword classifier.
///
/// `Search` is never produced by classification; it is stamped by the
/// orchestrator when a request falls through to knowledge search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Banking,
    Support,
    General,
    Search,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Banking => write!(f, "banking"),
            Category::Support => write!(f, "support"),
            Category::General => write!(f, "general"),
            Category::Search => write!(f, "search"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "banking" => Ok(Category::Banking),
            "support" => Ok(Category::Support),
            "general" => Ok(Category::General),
            "search" => Ok(Category::Search),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// Which backend produced a routed reply. Exactly one per reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    DialogueEngine,
    IntentService,
    KnowledgeSearch,
}

impl fmt::Display for ReplySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplySource::DialogueEngine => write!(f, "dialogue_engine"),
            ReplySource::IntentService => write!(f, "intent_service"),
            ReplySource::KnowledgeSearch => write!(f, "knowledge_search"),
        }
    }
}

/// Knowledge-search answer quality tier.
///
/// High means the engine returned a direct answer, Medium means only
/// supporting documents, Low means neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// Map the tier onto the normalized 0.0-1.0 confidence scale.
    ///
    /// The orchestrator does not consult this for routing; it stamps the
    /// configured fixed confidence on every search reply.
    pub fn score(&self) -> f32 {
        match self {
            ConfidenceTier::High => 0.9,
            ConfidenceTier::Medium => 0.6,
            ConfidenceTier::Low => 0.3,
        }
    }
}

/// Client-facing action carried in a reply payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadAction {
    #[serde(rename = "REQUIRE_AUTH")]
    RequireAuth,
    #[serde(rename = "TRANSFER_AGENT")]
    TransferAgent,
}

impl fmt::Display for PayloadAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadAction::RequireAuth => write!(f, "REQUIRE_AUTH"),
            PayloadAction::TransferAgent => write!(f, "TRANSFER_AGENT"),
        }
    }
}

// =============================================================================
// ParamValue - tagged parameter decoder
// =============================================================================

/// A backend parameter value, decoded from JSON by explicit kind.
///
/// One case per supported field kind; any other JSON shape (arrays, nested
/// objects) decodes to `Null`. Backend payloads are never reflected over.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Number(f64),
    Flag(bool),
    Null,
}

impl ParamValue {
    /// Decode a single JSON value. Total over all inputs.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => ParamValue::Text(s.clone()),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => ParamValue::Number(f),
                None => ParamValue::Null,
            },
            serde_json::Value::Bool(b) => ParamValue::Flag(*b),
            _ => ParamValue::Null,
        }
    }

    /// Flatten a JSON object into a parameter map, decoding each field.
    pub fn flatten(map: &serde_json::Map<String, serde_json::Value>) -> HashMap<String, ParamValue> {
        map.iter()
            .map(|(k, v)| (k.clone(), ParamValue::from_json(v)))
            .collect()
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ParamValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Text(s) => serializer.serialize_str(s),
            ParamValue::Number(n) => serializer.serialize_f64(*n),
            ParamValue::Flag(b) => serializer.serialize_bool(*b),
            ParamValue::Null => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(ParamValue::from_json(&value))
    }
}

// =============================================================================
// Conversation context
// =============================================================================

/// Name of the context that carries the authentication flag.
pub const AUTH_CONTEXT: &str = "authenticated";

/// A named, TTL-scoped piece of conversation state held by the dialogue
/// engine. The routing core treats contexts as opaque except for the
/// `authenticated` context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    /// Remaining conversational turns before the engine drops the context.
    #[serde(default)]
    pub lifespan: u32,
    #[serde(default)]
    pub parameters: HashMap<String, ParamValue>,
}

impl Context {
    /// Build the `authenticated` context injected alongside each dialogue
    /// request for backward compatibility with older integrations.
    pub fn authenticated(flag: bool) -> Self {
        let mut parameters = HashMap::new();
        parameters.insert(AUTH_CONTEXT.to_string(), ParamValue::Flag(flag));
        Context {
            name: AUTH_CONTEXT.to_string(),
            lifespan: 99,
            parameters,
        }
    }

    /// Whether this is the `authenticated` context with a true flag.
    pub fn grants_auth(&self) -> bool {
        self.name == AUTH_CONTEXT
            && self
                .parameters
                .get(AUTH_CONTEXT)
                .and_then(ParamValue::as_flag)
                .unwrap_or(false)
    }
}

// =============================================================================
// Normalized reply
// =============================================================================

/// A cited source returned by knowledge search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub uri: String,
    pub excerpt: String,
}

/// The single output shape all routing paths produce.
///
/// `quick_replies` and `sources` are always present, possibly empty;
/// `confidence` is always in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutedReply {
    pub source: ReplySource,
    pub category: Category,
    pub text: String,
    /// Intent label for analytics and testing.
    pub intent: String,
    pub confidence: f32,
    #[serde(default)]
    pub quick_replies: Vec<String>,
    /// Structured data block, present only when the dialogue engine emitted
    /// one (e.g. an authentication-required signal).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<HashMap<String, ParamValue>>,
    #[serde(default)]
    pub sources: Vec<Citation>,
}

// =============================================================================
// Tests
// =============================================================================
