//! Route handler functions.
//!
//! Each handler extracts a JSON body, calls into AppState services, and
//! returns a JSON response. The chat handler owns the outermost failure
//! policy: an uncaught adapter error becomes a fixed bot message, never a
//! raw error page.

use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use teller_core::types::{Category, Citation, Context, ParamValue, ReplySource, RoutedReply};
use teller_fulfillment::FulfillmentResponse;

use crate::error::ApiError;
use crate::state::AppState;

/// Bot message shown when a request fails completely.
const CONNECTION_FAILED_TEXT: &str =
    "I'm having trouble reaching our services right now. Please try again in a moment.";

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Opaque session id owned by the client; minted here on first message.
    pub session_id: Option<String>,
    /// Supplied by the session/auth gate in front of this service.
    #[serde(default)]
    pub authenticated: bool,
}

/// One bot bubble. Mirrors the normalized reply on success; on a complete
/// failure only `session_id`, `text`, and the empty sequences are present.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ReplySource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub quick_replies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<HashMap<String, ParamValue>>,
    #[serde(default)]
    pub sources: Vec<Citation>,
}

impl ChatResponse {
    fn from_reply(session_id: String, reply: RoutedReply) -> Self {
        Self {
            session_id,
            text: reply.text,
            source: Some(reply.source),
            category: Some(reply.category),
            intent: Some(reply.intent),
            confidence: Some(reply.confidence),
            quick_replies: reply.quick_replies,
            payload: reply.payload,
            sources: reply.sources,
        }
    }

    fn connection_failed(session_id: String) -> Self {
        Self {
            session_id,
            text: CONNECTION_FAILED_TEXT.to_string(),
            source: None,
            category: None,
            intent: None,
            confidence: None,
            quick_replies: Vec::new(),
            payload: None,
            sources: Vec::new(),
        }
    }
}

/// Webhook request the dialogue engine posts after resolving an intent.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookRequest {
    pub intent: String,
    #[serde(default)]
    pub parameters: HashMap<String, ParamValue>,
    #[serde(default)]
    pub contexts: Vec<Context>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// POST /chat
///
/// Routes one message through the orchestrator. Always returns 200 with a
/// renderable bot bubble once the request itself is well-formed.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    let session_id = request
        .session_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    match state
        .orchestrator
        .route_request(&request.message, &session_id, request.authenticated)
        .await
    {
        Ok(reply) => Ok(Json(ChatResponse::from_reply(session_id, reply))),
        Err(e) => {
            tracing::warn!(error = %e, session_id, "Routing failed; returning fallback bubble");
            Ok(Json(ChatResponse::connection_failed(session_id)))
        }
    }
}

/// POST /fulfillment
///
/// The dialogue-engine webhook. The handler itself never fails; internal
/// errors are already converted to an apology reply downstream.
pub async fn fulfillment(
    State(state): State<AppState>,
    Json(request): Json<WebhookRequest>,
) -> Json<FulfillmentResponse> {
    let response = state
        .fulfillment
        .handle_intent(&request.intent, &request.parameters, &request.contexts)
        .await;
    Json(response)
}

// =============================================================================
// Tests
// =============================================================================
