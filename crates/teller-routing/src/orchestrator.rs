//! Request orchestrator: the backend waterfall.
//!
//! Given one message, classify it, pick a backend path, apply the failover
//! policy, and return one normalized result shape regardless of which
//! backend served it. Backends are injected at construction; the
//! orchestrator holds no other state.

use std::sync::Arc;

use teller_core::config::RoutingConfig;
use teller_core::types::{Category, ReplySource, RoutedReply};

use teller_adapters::{AdapterError, DialogueEngine, IntentRecognizer, KnowledgeSearch};

use crate::classifier::classify;

/// Quick replies stamped on every knowledge-search reply. Fixed menu, not
/// search-engine-supplied.
const SEARCH_QUICK_REPLIES: [&str; 2] = ["Talk to Agent", "Main Menu"];

/// Intent label stamped on the knowledge-search path.
const SEARCH_INTENT: &str = "KnowledgeSearch";

/// Routes each message to exactly one backend path.
pub struct Orchestrator {
    dialogue: Arc<dyn DialogueEngine>,
    intent: Arc<dyn IntentRecognizer>,
    search: Arc<dyn KnowledgeSearch>,
    config: RoutingConfig,
}

impl Orchestrator {
    /// Create an orchestrator over the injected backend clients.
    pub fn new(
        dialogue: Arc<dyn DialogueEngine>,
        intent: Arc<dyn IntentRecognizer>,
        search: Arc<dyn KnowledgeSearch>,
        config: RoutingConfig,
    ) -> Self {
        Self {
            dialogue,
            intent,
            search,
            config,
        }
    }

    /// Route one message.
    ///
    /// Banking-category messages go to the dialogue engine and are returned
    /// directly, never failed over (even on a low-confidence reply), because
    /// the engine alone owns multi-turn slot-filling state. Everything else
    /// goes to the intent service first and falls through to knowledge
    /// search on a miss (fallback intent or confidence below threshold).
    ///
    /// Adapter errors propagate unmodified; there is no tertiary fallback.
    /// A knowledge-search failure after an intent miss fails the whole
    /// request by design.
    pub async fn route_request(
        &self,
        text: &str,
        session_id: &str,
        authenticated: bool,
    ) -> Result<RoutedReply, AdapterError> {
        let category = classify(text);
        tracing::debug!(%category, session_id, "Classified message");

        if category == Category::Banking {
            let reply = self.dialogue.detect(text, session_id, authenticated).await?;
            return Ok(RoutedReply {
                source: ReplySource::DialogueEngine,
                category,
                text: reply.text,
                intent: reply.intent,
                // The engine is authoritative on this path; a missing score
                // never affects routing, only analytics.
                confidence: reply.confidence.unwrap_or(1.0).clamp(0.0, 1.0),
                quick_replies: reply.quick_replies,
                payload: reply.payload,
                sources: Vec::new(),
            });
        }

        let reply = self.intent.recognize(text, session_id).await?;
        let miss = reply.intent == self.config.fallback_intent
            || reply.confidence < self.config.confidence_threshold;

        if !miss {
            return Ok(RoutedReply {
                source: ReplySource::IntentService,
                category,
                text: reply.text,
                intent: reply.intent,
                confidence: reply.confidence,
                quick_replies: reply.quick_replies,
                payload: None,
                sources: Vec::new(),
            });
        }

        tracing::debug!(
            intent = %reply.intent,
            confidence = reply.confidence,
            "Intent service missed; falling through to knowledge search"
        );
        let found = self.search.search(text).await?;
        Ok(RoutedReply {
            source: ReplySource::KnowledgeSearch,
            category: Category::Search,
            text: found.text,
            intent: SEARCH_INTENT.to_string(),
            // Fixed by policy: search hits are treated as high-confidence
            // regardless of the engine's own tier.
            confidence: self.config.search_confidence,
            quick_replies: SEARCH_QUICK_REPLIES.iter().map(|s| s.to_string()).collect(),
            payload: None,
            sources: found.sources,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use teller_adapters::{DialogueReply, IntentReply, SearchReply};
    use teller_core::types::{Citation, ConfidenceTier, ParamValue};

    // ---- Fakes ----

    struct FakeDialogue {
        reply: DialogueReply,
        calls: AtomicUsize,
    }

    impl FakeDialogue {
        fn new(reply: DialogueReply) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DialogueEngine for FakeDialogue {
        async fn detect(
            &self,
            _text: &str,
            _session_id: &str,
            _authenticated: bool,
        ) -> Result<DialogueReply, AdapterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct FailingDialogue;

    #[async_trait]
    impl DialogueEngine for FailingDialogue {
        async fn detect(
            &self,
            _text: &str,
            _session_id: &str,
            _authenticated: bool,
        ) -> Result<DialogueReply, AdapterError> {
            Err(AdapterError::Transport {
                service: "dialogue engine",
                message: "connection refused".to_string(),
            })
        }
    }

    struct FakeIntent {
        reply: IntentReply,
        calls: AtomicUsize,
    }

    impl FakeIntent {
        fn new(reply: IntentReply) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl IntentRecognizer for FakeIntent {
        async fn recognize(
            &self,
            _text: &str,
            _session_id: &str,
        ) -> Result<IntentReply, AdapterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct FakeSearch {
        reply: SearchReply,
        calls: AtomicUsize,
    }

    impl FakeSearch {
        fn new(reply: SearchReply) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl KnowledgeSearch for FakeSearch {
        async fn search(&self, _text: &str) -> Result<SearchReply, AdapterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl KnowledgeSearch for FailingSearch {
        async fn search(&self, _text: &str) -> Result<SearchReply, AdapterError> {
            Err(AdapterError::Backend {
                service: "knowledge search",
                status: 503,
                message: "overloaded".to_string(),
            })
        }
    }

    // ---- Builders ----

    fn dialogue_reply(intent: &str) -> DialogueReply {
        DialogueReply {
            text: format!("dialogue reply for {}", intent),
            intent: intent.to_string(),
            confidence: Some(0.95),
            quick_replies: vec!["Check Balance".to_string()],
            payload: None,
        }
    }

    fn intent_reply(intent: &str, confidence: f32) -> IntentReply {
        IntentReply {
            text: format!("intent reply for {}", intent),
            intent: intent.to_string(),
            confidence,
            quick_replies: vec!["Account info".to_string()],
        }
    }

    fn search_reply() -> SearchReply {
        SearchReply {
            text: "Wire transfers cost $25.".to_string(),
            sources: vec![Citation {
                title: "Fee schedule".to_string(),
                uri: "https://kb/fees".to_string(),
                excerpt: "Wire transfers cost $25.".to_string(),
            }],
            tier: ConfidenceTier::High,
        }
    }

    fn orchestrator(
        dialogue: Arc<dyn DialogueEngine>,
        intent: Arc<dyn IntentRecognizer>,
        search: Arc<dyn KnowledgeSearch>,
    ) -> Orchestrator {
        Orchestrator::new(dialogue, intent, search, RoutingConfig::default())
    }

    // ---- Banking path ----

    #[tokio::test]
    async fn test_banking_routes_to_dialogue_engine() {
        let dialogue = Arc::new(FakeDialogue::new(dialogue_reply("check.balance")));
        let intent = Arc::new(FakeIntent::new(intent_reply("hours", 0.9)));
        let search = Arc::new(FakeSearch::new(search_reply()));
        let orch = orchestrator(dialogue.clone(), intent.clone(), search.clone());

        let reply = orch
            .route_request("check my balance", "s1", true)
            .await
            .unwrap();

        assert_eq!(reply.source, ReplySource::DialogueEngine);
        assert_eq!(reply.category, Category::Banking);
        assert_eq!(reply.intent, "check.balance");
        assert_eq!(dialogue.calls.load(Ordering::SeqCst), 1);
        // The other backends are never touched on the banking path.
        assert_eq!(intent.calls.load(Ordering::SeqCst), 0);
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_banking_never_fails_over_on_low_confidence() {
        let mut low = dialogue_reply("Fallback");
        low.confidence = Some(0.05);
        let dialogue = Arc::new(FakeDialogue::new(low));
        let search = Arc::new(FakeSearch::new(search_reply()));
        let orch = orchestrator(
            dialogue,
            Arc::new(FakeIntent::new(intent_reply("hours", 0.9))),
            search.clone(),
        );

        let reply = orch
            .route_request("transfer funds please", "s1", true)
            .await
            .unwrap();

        assert_eq!(reply.source, ReplySource::DialogueEngine);
        assert_eq!(reply.confidence, 0.05);
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_banking_missing_confidence_fills_one() {
        let mut reply = dialogue_reply("check.balance");
        reply.confidence = None;
        let orch = orchestrator(
            Arc::new(FakeDialogue::new(reply)),
            Arc::new(FakeIntent::new(intent_reply("hours", 0.9))),
            Arc::new(FakeSearch::new(search_reply())),
        );

        let routed = orch.route_request("my balance", "s1", false).await.unwrap();
        assert_eq!(routed.confidence, 1.0);
    }

    #[tokio::test]
    async fn test_banking_payload_passes_through() {
        let mut with_payload = dialogue_reply("check.balance");
        with_payload.payload = Some(
            [(
                "action".to_string(),
                ParamValue::Text("REQUIRE_AUTH".to_string()),
            )]
            .into_iter()
            .collect(),
        );
        let orch = orchestrator(
            Arc::new(FakeDialogue::new(with_payload)),
            Arc::new(FakeIntent::new(intent_reply("hours", 0.9))),
            Arc::new(FakeSearch::new(search_reply())),
        );

        let reply = orch.route_request("my balance", "s1", false).await.unwrap();
        let payload = reply.payload.unwrap();
        assert_eq!(
            payload.get("action"),
            Some(&ParamValue::Text("REQUIRE_AUTH".to_string()))
        );
    }

    #[tokio::test]
    async fn test_banking_adapter_error_propagates() {
        let orch = orchestrator(
            Arc::new(FailingDialogue),
            Arc::new(FakeIntent::new(intent_reply("hours", 0.9))),
            Arc::new(FakeSearch::new(search_reply())),
        );

        let err = orch
            .route_request("check my balance", "s1", true)
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Transport { .. }));
    }

    // ---- Intent-service path ----

    #[tokio::test]
    async fn test_confident_intent_returned_directly() {
        let intent = Arc::new(FakeIntent::new(intent_reply("hours", 0.85)));
        let search = Arc::new(FakeSearch::new(search_reply()));
        let orch = orchestrator(
            Arc::new(FakeDialogue::new(dialogue_reply("unused"))),
            intent.clone(),
            search.clone(),
        );

        let reply = orch
            .route_request("what are your hours", "s1", false)
            .await
            .unwrap();

        assert_eq!(reply.source, ReplySource::IntentService);
        assert_eq!(reply.category, Category::Support);
        assert_eq!(reply.intent, "hours");
        assert_eq!(reply.confidence, 0.85);
        assert!(reply.payload.is_none());
        assert!(reply.sources.is_empty());
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_general_category_preserved_on_hit() {
        let orch = orchestrator(
            Arc::new(FakeDialogue::new(dialogue_reply("unused"))),
            Arc::new(FakeIntent::new(intent_reply("greeting", 0.75))),
            Arc::new(FakeSearch::new(search_reply())),
        );

        let reply = orch.route_request("good morning", "s1", false).await.unwrap();
        assert_eq!(reply.category, Category::General);
        assert_eq!(reply.source, ReplySource::IntentService);
    }

    #[tokio::test]
    async fn test_threshold_boundary_is_not_a_miss() {
        let search = Arc::new(FakeSearch::new(search_reply()));
        let orch = orchestrator(
            Arc::new(FakeDialogue::new(dialogue_reply("unused"))),
            Arc::new(FakeIntent::new(intent_reply("hours", 0.60))),
            search.clone(),
        );

        let reply = orch
            .route_request("what are your hours", "s1", false)
            .await
            .unwrap();
        // Exactly at the threshold: not below, so not a miss.
        assert_eq!(reply.source, ReplySource::IntentService);
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    // ---- Knowledge-search fallback ----

    #[tokio::test]
    async fn test_low_confidence_falls_through_to_search() {
        let intent = Arc::new(FakeIntent::new(intent_reply("hours", 0.59)));
        let search = Arc::new(FakeSearch::new(search_reply()));
        let orch = orchestrator(
            Arc::new(FakeDialogue::new(dialogue_reply("unused"))),
            intent.clone(),
            search.clone(),
        );

        let reply = orch
            .route_request("what are your hours", "s1", false)
            .await
            .unwrap();

        assert_eq!(reply.source, ReplySource::KnowledgeSearch);
        assert_eq!(reply.category, Category::Search);
        assert_eq!(reply.intent, "KnowledgeSearch");
        assert_eq!(reply.confidence, 0.90);
        assert_eq!(reply.quick_replies, vec!["Talk to Agent", "Main Menu"]);
        assert_eq!(reply.sources.len(), 1);
        // Sequential: the intent service was still consulted first.
        assert_eq!(intent.calls.load(Ordering::SeqCst), 1);
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_intent_falls_through_even_when_confident() {
        let search = Arc::new(FakeSearch::new(search_reply()));
        let orch = orchestrator(
            Arc::new(FakeDialogue::new(dialogue_reply("unused"))),
            Arc::new(FakeIntent::new(intent_reply("Fallback", 0.99))),
            search.clone(),
        );

        let reply = orch
            .route_request("something odd", "s1", false)
            .await
            .unwrap();
        assert_eq!(reply.source, ReplySource::KnowledgeSearch);
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_search_confidence_is_fixed_regardless_of_tier() {
        let mut low_tier = search_reply();
        low_tier.tier = ConfidenceTier::Low;
        let orch = orchestrator(
            Arc::new(FakeDialogue::new(dialogue_reply("unused"))),
            Arc::new(FakeIntent::new(intent_reply("Fallback", 0.0))),
            Arc::new(FakeSearch::new(low_tier)),
        );

        let reply = orch.route_request("mystery", "s1", false).await.unwrap();
        // The engine's own tier is deliberately discarded.
        assert_eq!(reply.confidence, 0.90);
    }

    #[tokio::test]
    async fn test_search_failure_after_miss_is_hard_failure() {
        let orch = orchestrator(
            Arc::new(FakeDialogue::new(dialogue_reply("unused"))),
            Arc::new(FakeIntent::new(intent_reply("Fallback", 0.0))),
            Arc::new(FailingSearch),
        );

        // No tertiary fallback exists by design.
        let err = orch
            .route_request("something odd", "s1", false)
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Backend { status: 503, .. }));
    }

    // ---- Configurable policy ----

    #[tokio::test]
    async fn test_custom_threshold_changes_miss_judgement() {
        let config = RoutingConfig {
            confidence_threshold: 0.95,
            ..RoutingConfig::default()
        };
        let search = Arc::new(FakeSearch::new(search_reply()));
        let orch = Orchestrator::new(
            Arc::new(FakeDialogue::new(dialogue_reply("unused"))),
            Arc::new(FakeIntent::new(intent_reply("hours", 0.90))),
            search.clone(),
            config,
        );

        let reply = orch
            .route_request("what are your hours", "s1", false)
            .await
            .unwrap();
        // 0.90 < 0.95 threshold: a miss under this config.
        assert_eq!(reply.source, ReplySource::KnowledgeSearch);
    }

    #[tokio::test]
    async fn test_custom_fallback_label() {
        let config = RoutingConfig {
            fallback_intent: "NO_MATCH".to_string(),
            ..RoutingConfig::default()
        };
        let search = Arc::new(FakeSearch::new(search_reply()));
        let orch = Orchestrator::new(
            Arc::new(FakeDialogue::new(dialogue_reply("unused"))),
            Arc::new(FakeIntent::new(intent_reply("NO_MATCH", 0.99))),
            search.clone(),
            config,
        );

        let reply = orch.route_request("hello", "s1", false).await.unwrap();
        assert_eq!(reply.source, ReplySource::KnowledgeSearch);
    }
}
