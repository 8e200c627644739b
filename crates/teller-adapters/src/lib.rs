//! Backend adapters for the Teller routing core.
//!
//! One adapter per conversational-AI backend: the stateful dialogue engine,
//! the managed intent-recognition service, and the document search service.
//! Each adapter is an async trait (injected into the orchestrator by the
//! host application) plus an HTTP implementation and a pure normalization
//! function from the backend's wire shape to the adapter's reply type.

pub mod dialogue;
pub mod error;
pub mod intent;
pub mod search;

pub use dialogue::{DialogueEngine, DialogueReply, HttpDialogueEngine};
pub use error::AdapterError;
pub use intent::{HttpIntentRecognizer, IntentRecognizer, IntentReply};
pub use search::{HttpKnowledgeSearch, KnowledgeSearch, SearchReply};
