//! Dialogue-management engine adapter.
//!
//! The dialogue engine is the stateful backend: it manages multi-turn
//! slot-filling and named contexts keyed by session id. This adapter sends
//! the raw text plus the auth flag and normalizes the reply down to one
//! shape; it never inspects the engine's server-side state.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use teller_core::config::DialogueConfig;
use teller_core::types::{Context, ParamValue};

use crate::error::AdapterError;

const SERVICE: &str = "dialogue engine";

/// Normalized dialogue-engine reply.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueReply {
    pub text: String,
    /// Name of the detected intent.
    pub intent: String,
    /// Detection confidence, when the engine reports one.
    pub confidence: Option<f32>,
    pub quick_replies: Vec<String>,
    /// First structured payload block found among the response variants,
    /// flattened through the tagged decoder.
    pub payload: Option<HashMap<String, ParamValue>>,
}

/// Contract for the dialogue-management backend.
#[async_trait]
pub trait DialogueEngine: Send + Sync {
    /// Run intent detection for one message within a session.
    async fn detect(
        &self,
        text: &str,
        session_id: &str,
        authenticated: bool,
    ) -> Result<DialogueReply, AdapterError>;
}

// =============================================================================
// Wire shapes
// =============================================================================

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    agent_id: &'a str,
    session_id: &'a str,
    text: &'a str,
    language: &'a str,
    /// Request-level auth flag.
    authenticated: bool,
    /// The same flag again as a named context, for older integrations that
    /// only read contexts.
    contexts: Vec<Context>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetectResponse {
    #[serde(default)]
    pub(crate) intent: String,
    #[serde(default)]
    pub(crate) confidence: Option<f32>,
    #[serde(default)]
    pub(crate) messages: Vec<ResponseVariant>,
}

/// One message variant in the engine's response. A variant carries at most
/// one of: plain text, quick replies, a structured payload.
#[derive(Debug, Deserialize)]
pub(crate) struct ResponseVariant {
    #[serde(default)]
    pub(crate) text: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) quick_replies: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) payload: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Normalize the engine's variant list into a single reply.
///
/// Takes the first non-empty text, the first non-empty quick-reply list,
/// and the first payload block. Pure; safe to call repeatedly.
pub(crate) fn normalize_detect(response: DetectResponse) -> DialogueReply {
    let mut text = String::new();
    let mut quick_replies = Vec::new();
    let mut payload = None;

    for variant in &response.messages {
        if text.is_empty() {
            if let Some(lines) = &variant.text {
                if let Some(first) = lines.iter().find(|l| !l.is_empty()) {
                    text = first.clone();
                }
            }
        }
        if quick_replies.is_empty() {
            if let Some(replies) = &variant.quick_replies {
                if !replies.is_empty() {
                    quick_replies = replies.clone();
                }
            }
        }
        if payload.is_none() {
            if let Some(block) = &variant.payload {
                payload = Some(ParamValue::flatten(block));
            }
        }
    }

    DialogueReply {
        text,
        intent: response.intent,
        confidence: response.confidence,
        quick_replies,
        payload,
    }
}

// =============================================================================
// HTTP implementation
// =============================================================================

/// Dialogue engine client over HTTP.
#[derive(Debug)]
pub struct HttpDialogueEngine {
    client: reqwest::Client,
    endpoint: String,
    agent_id: String,
    language: String,
}

impl HttpDialogueEngine {
    /// Build a client from configuration. Fails if the endpoint is missing
    /// rather than at first use.
    pub fn new(config: &DialogueConfig) -> Result<Self, AdapterError> {
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
            agent_id: config.agent_id.clone(),
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl DialogueEngine for HttpDialogueEngine {
    async fn detect(
        &self,
        text: &str,
        session_id: &str,
        authenticated: bool,
    ) -> Result<DialogueReply, AdapterError> {
        let request = DetectRequest {
            agent_id: &self.agent_id,
            session_id,
            text,
            language: &self.language,
            authenticated,
            contexts: vec![Context::authenticated(authenticated)],
        };

        let url = format!("{}/v1/detect", self.endpoint);
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

        let parsed: DetectResponse =
            response
                .json()
                .await
                .map_err(|e| AdapterError::InvalidResponse {
                    service: SERVICE,
                    message: e.to_string(),
                })?;

        let reply = normalize_detect(parsed);
        tracing::debug!(intent = %reply.intent, session_id, "Dialogue engine replied");
        Ok(reply)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn response_from_json(json: serde_json::Value) -> DetectResponse {
        serde_json::from_value(json).unwrap()
    }

    // ---- normalize_detect ----

    #[test]
    fn test_normalize_takes_first_nonempty_text() {
        let resp = response_from_json(serde_json::json!({
            "intent": "check.balance",
            "messages": [
                {"text": [""]},
                {"text": ["Your balance is $100.", "unused second line"]},
                {"text": ["later variant ignored"]},
            ],
        }));
        let reply = normalize_detect(resp);
        assert_eq!(reply.text, "Your balance is $100.");
        assert_eq!(reply.intent, "check.balance");
    }

    #[test]
    fn test_normalize_takes_first_nonempty_quick_replies() {
        let resp = response_from_json(serde_json::json!({
            "intent": "welcome",
            "messages": [
                {"quick_replies": []},
                {"quick_replies": ["Check Balance", "Transfer Funds"]},
                {"quick_replies": ["ignored"]},
            ],
        }));
        let reply = normalize_detect(resp);
        assert_eq!(reply.quick_replies, vec!["Check Balance", "Transfer Funds"]);
    }

    #[test]
    fn test_normalize_flattens_first_payload() {
        let resp = response_from_json(serde_json::json!({
            "intent": "check.balance",
            "messages": [
                {"payload": {"action": "REQUIRE_AUTH", "attempts": 2, "final": false, "extra": [1]}},
                {"payload": {"action": "ignored"}},
            ],
        }));
        let reply = normalize_detect(resp);
        let payload = reply.payload.unwrap();
        assert_eq!(
            payload.get("action"),
            Some(&ParamValue::Text("REQUIRE_AUTH".to_string()))
        );
        assert_eq!(payload.get("attempts"), Some(&ParamValue::Number(2.0)));
        assert_eq!(payload.get("final"), Some(&ParamValue::Flag(false)));
        // Unknown kinds decode to null rather than being reflected over.
        assert_eq!(payload.get("extra"), Some(&ParamValue::Null));
    }

    #[test]
    fn test_normalize_empty_response() {
        let resp = response_from_json(serde_json::json!({}));
        let reply = normalize_detect(resp);
        assert_eq!(reply.text, "");
        assert_eq!(reply.intent, "");
        assert_eq!(reply.confidence, None);
        assert!(reply.quick_replies.is_empty());
        assert!(reply.payload.is_none());
    }

    #[test]
    fn test_normalize_carries_confidence() {
        let resp = response_from_json(serde_json::json!({
            "intent": "transfer.funds",
            "confidence": 0.93,
            "messages": [{"text": ["How much?"]}],
        }));
        let reply = normalize_detect(resp);
        assert_eq!(reply.confidence, Some(0.93));
    }

    #[test]
    fn test_normalize_is_idempotent_over_same_wire_body() {
        let json = serde_json::json!({
            "intent": "welcome",
            "messages": [{"text": ["Hi"]}, {"quick_replies": ["Menu"]}],
        });
        let a = normalize_detect(response_from_json(json.clone()));
        let b = normalize_detect(response_from_json(json));
        assert_eq!(a, b);
    }

    // ---- request construction ----

    #[test]
    fn test_detect_request_carries_auth_twice() {
        let request = DetectRequest {
            agent_id: "teller-demo",
            session_id: "abc",
            text: "check my balance",
            language: "en",
            authenticated: true,
            contexts: vec![Context::authenticated(true)],
        };
        let json = serde_json::to_value(&request).unwrap();
        // Request-level flag.
        assert_eq!(json["authenticated"], serde_json::json!(true));
        // And the redundant context for older integrations.
        assert_eq!(json["contexts"][0]["name"], serde_json::json!("authenticated"));
        assert_eq!(
            json["contexts"][0]["parameters"]["authenticated"],
            serde_json::json!(true)
        );
    }

    // ---- construction ----

    #[test]
    fn test_http_engine_rejects_empty_endpoint() {
        let config = DialogueConfig {
            endpoint: String::new(),
            ..DialogueConfig::default()
        };
        let err = HttpDialogueEngine::new(&config).unwrap_err();
        assert!(matches!(err, AdapterError::Configuration { .. }));
    }

    #[test]
    fn test_http_engine_strips_trailing_slash() {
        let config = DialogueConfig {
            endpoint: "http://localhost:8081/".to_string(),
            ..DialogueConfig::default()
        };
        let engine = HttpDialogueEngine::new(&config).unwrap();
        assert_eq!(engine.endpoint, "http://localhost:8081");
    }
}
