//! Document search / knowledge retrieval adapter.
//!
//! The most expensive backend, invoked only after the intent service has
//! confidently failed. Returns a free-text answer with cited sources and a
//! tier describing how the answer was found.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use teller_core::config::SearchServiceConfig;
use teller_core::types::{Citation, ConfidenceTier};

use crate::error::AdapterError;

const SERVICE: &str = "knowledge search";

/// Fixed reply when the index returns nothing at all. This exact case is
/// what routes users toward human handoff.
const NO_ANSWER_TEXT: &str =
    "I couldn't find an answer to that. Would you like to talk to an agent?";

/// Normalized knowledge-search reply.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReply {
    pub text: String,
    pub sources: Vec<Citation>,
    pub tier: ConfidenceTier,
}

/// Contract for the document search backend.
#[async_trait]
pub trait KnowledgeSearch: Send + Sync {
    async fn search(&self, text: &str) -> Result<SearchReply, AdapterError>;
}

// =============================================================================
// Wire shapes
// =============================================================================

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    index_id: &'a str,
    query: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub(crate) results: Vec<ResultItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultItem {
    /// "answer" for a direct-answer extraction, "document" for a supporting
    /// document hit. Anything else is treated as a document.
    #[serde(default)]
    pub(crate) kind: String,
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) uri: String,
    #[serde(default)]
    pub(crate) excerpt: String,
}

/// Normalize a search response.
///
/// Tier is High when a direct-answer item is present, Medium when only
/// documents came back, Low when there were zero results of any kind (with
/// the fixed no-answer text and no sources). Pure.
pub(crate) fn normalize_query(response: QueryResponse) -> SearchReply {
    if response.results.is_empty() {
        return SearchReply {
            text: NO_ANSWER_TEXT.to_string(),
            sources: Vec::new(),
            tier: ConfidenceTier::Low,
        };
    }

    let answer = response.results.iter().find(|r| r.kind == "answer");
    let (text, tier) = match answer {
        Some(item) => (item.excerpt.clone(), ConfidenceTier::High),
        None => {
            let top = &response.results[0];
            (
                format!("Here's what I found: {}", top.excerpt),
                ConfidenceTier::Medium,
            )
        }
    };

    let sources = response
        .results
        .iter()
        .map(|r| Citation {
            title: r.title.clone(),
            uri: r.uri.clone(),
            excerpt: r.excerpt.clone(),
        })
        .collect();

    SearchReply {
        text,
        sources,
        tier,
    }
}

// =============================================================================
// HTTP implementation
// =============================================================================

/// Knowledge-search client over HTTP.
#[derive(Debug)]
pub struct HttpKnowledgeSearch {
    client: reqwest::Client,
    endpoint: String,
    index_id: String,
}

impl HttpKnowledgeSearch {
    pub fn new(config: &SearchServiceConfig) -> Result<Self, AdapterError> {
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
            index_id: config.index_id.clone(),
        })
    }
}

#[async_trait]
impl KnowledgeSearch for HttpKnowledgeSearch {
    async fn search(&self, text: &str) -> Result<SearchReply, AdapterError> {
        let request = QueryRequest {
            index_id: &self.index_id,
            query: text,
        };

        let url = format!("{}/v1/query", self.endpoint);
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

        let parsed: QueryResponse =
            response
                .json()
                .await
                .map_err(|e| AdapterError::InvalidResponse {
                    service: SERVICE,
                    message: e.to_string(),
                })?;

        let reply = normalize_query(parsed);
        tracing::debug!(tier = ?reply.tier, sources = reply.sources.len(), "Knowledge search replied");
        Ok(reply)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn response_from_json(json: serde_json::Value) -> QueryResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_normalize_direct_answer_is_high_tier() {
        let resp = response_from_json(serde_json::json!({
            "results": [
                {"kind": "document", "title": "Fees", "uri": "https://kb/fees", "excerpt": "Fee table."},
                {"kind": "answer", "title": "Wire fees", "uri": "https://kb/wire", "excerpt": "Wire transfers cost $25."},
            ],
        }));
        let reply = normalize_query(resp);
        assert_eq!(reply.tier, ConfidenceTier::High);
        assert_eq!(reply.text, "Wire transfers cost $25.");
        assert_eq!(reply.sources.len(), 2);
        assert_eq!(reply.sources[0].title, "Fees");
    }

    #[test]
    fn test_normalize_documents_only_is_medium_tier() {
        let resp = response_from_json(serde_json::json!({
            "results": [
                {"kind": "document", "title": "Branch hours", "uri": "https://kb/hours", "excerpt": "Open 9-5 weekdays."},
            ],
        }));
        let reply = normalize_query(resp);
        assert_eq!(reply.tier, ConfidenceTier::Medium);
        assert!(reply.text.contains("Open 9-5 weekdays."));
        assert_eq!(reply.sources.len(), 1);
    }

    #[test]
    fn test_normalize_unknown_kind_treated_as_document() {
        let resp = response_from_json(serde_json::json!({
            "results": [
                {"kind": "snippet", "title": "Misc", "uri": "https://kb/misc", "excerpt": "Something."},
            ],
        }));
        let reply = normalize_query(resp);
        assert_eq!(reply.tier, ConfidenceTier::Medium);
    }

    #[test]
    fn test_normalize_zero_results_fixed_handoff_reply() {
        let reply = normalize_query(response_from_json(serde_json::json!({"results": []})));
        assert_eq!(reply.tier, ConfidenceTier::Low);
        assert!(reply.sources.is_empty());
        assert_eq!(
            reply.text,
            "I couldn't find an answer to that. Would you like to talk to an agent?"
        );
    }

    #[test]
    fn test_normalize_missing_results_field() {
        let reply = normalize_query(response_from_json(serde_json::json!({})));
        assert_eq!(reply.tier, ConfidenceTier::Low);
    }

    #[test]
    fn test_normalize_is_idempotent_over_same_wire_body() {
        let json = serde_json::json!({
            "results": [
                {"kind": "answer", "title": "T", "uri": "u", "excerpt": "E"},
            ],
        });
        let a = normalize_query(response_from_json(json.clone()));
        let b = normalize_query(response_from_json(json));
        assert_eq!(a, b);
    }

    #[test]
    fn test_http_search_rejects_empty_endpoint() {
        let config = SearchServiceConfig {
            endpoint: String::new(),
            ..SearchServiceConfig::default()
        };
        let err = HttpKnowledgeSearch::new(&config).unwrap_err();
        assert!(matches!(err, AdapterError::Configuration { .. }));
    }
}
