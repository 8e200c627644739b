//! Managed intent-recognition service adapter.
//!
//! Stateless per call: one text in, one best intent with a confidence score
//! out. The orchestrator judges misses against the fallback label and the
//! configured confidence threshold; this adapter only normalizes.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use teller_core::config::IntentServiceConfig;

use crate::error::AdapterError;

const SERVICE: &str = "intent service";

/// Quick replies offered when the backend's response card has none.
/// The UI always gets navigation options on this path.
const DEFAULT_QUICK_REPLIES: [&str; 3] = ["Account info", "Fees", "Hours"];

/// Normalized intent-service reply.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentReply {
    pub text: String,
    pub intent: String,
    /// Best-interpretation confidence; 0.0 when the service reported none.
    pub confidence: f32,
    pub quick_replies: Vec<String>,
}

/// Contract for the managed intent-recognition backend.
#[async_trait]
pub trait IntentRecognizer: Send + Sync {
    async fn recognize(&self, text: &str, session_id: &str) -> Result<IntentReply, AdapterError>;
}

// =============================================================================
// Wire shapes
// =============================================================================

#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    bot_id: &'a str,
    session_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecognizeResponse {
    #[serde(default)]
    pub(crate) messages: Vec<ServiceMessage>,
    #[serde(default)]
    pub(crate) interpretations: Vec<Interpretation>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServiceMessage {
    #[serde(default)]
    pub(crate) content: Option<String>,
    #[serde(default)]
    pub(crate) card: Option<ResponseCard>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseCard {
    #[serde(default)]
    pub(crate) buttons: Vec<CardButton>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CardButton {
    pub(crate) text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Interpretation {
    #[serde(default)]
    pub(crate) intent: String,
    #[serde(default)]
    pub(crate) confidence: Option<f32>,
}

/// Normalize the service response: first plain-text message, first
/// interpretation's confidence (absent -> 0.0), card buttons or the fixed
/// default quick replies. Pure.
pub(crate) fn normalize_recognize(response: RecognizeResponse, fallback_intent: &str) -> IntentReply {
    let text = response
        .messages
        .iter()
        .find_map(|m| m.content.as_ref().filter(|c| !c.is_empty()))
        .cloned()
        .unwrap_or_default();

    let (intent, confidence) = match response.interpretations.first() {
        Some(interp) => (
            interp.intent.clone(),
            interp.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
        ),
        None => (fallback_intent.to_string(), 0.0),
    };

    let quick_replies: Vec<String> = response
        .messages
        .iter()
        .filter_map(|m| m.card.as_ref())
        .flat_map(|card| card.buttons.iter().map(|b| b.text.clone()))
        .collect();
    let quick_replies = if quick_replies.is_empty() {
        DEFAULT_QUICK_REPLIES.iter().map(|s| s.to_string()).collect()
    } else {
        quick_replies
    };

    IntentReply {
        text,
        intent,
        confidence,
        quick_replies,
    }
}

// =============================================================================
// HTTP implementation
// =============================================================================

/// Intent-recognition client over HTTP.
#[derive(Debug)]
pub struct HttpIntentRecognizer {
    client: reqwest::Client,
    endpoint: String,
    bot_id: String,
    fallback_intent: String,
}

impl HttpIntentRecognizer {
    pub fn new(config: &IntentServiceConfig, fallback_intent: &str) -> Result<Self, AdapterError> {
        if config.endpoint.is_empty() {
            return Err(AdapterError::Configuration {
                service: SERVICE,
                message: "endpoint is empty".to_string(),
            });
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AdapterError::Configuration {
                service: SERVICE,
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            bot_id: config.bot_id.clone(),
            fallback_intent: fallback_intent.to_string(),
        })
    }
}

#[async_trait]
impl IntentRecognizer for HttpIntentRecognizer {
    async fn recognize(&self, text: &str, session_id: &str) -> Result<IntentReply, AdapterError> {
        let request = RecognizeRequest {
            bot_id: &self.bot_id,
            session_id,
            text,
        };

        let url = format!("{}/v1/recognize", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AdapterError::Transport {
                service: SERVICE,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::Backend {
                service: SERVICE,
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: RecognizeResponse =
            response
                .json()
                .await
                .map_err(|e| AdapterError::InvalidResponse {
                    service: SERVICE,
                    message: e.to_string(),
                })?;

        let reply = normalize_recognize(parsed, &self.fallback_intent);
        tracing::debug!(
            intent = %reply.intent,
            confidence = reply.confidence,
            session_id,
            "Intent service replied"
        );
        Ok(reply)
    }
}

// =============================================================================
// Tests
// =============================================================================
