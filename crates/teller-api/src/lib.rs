//! HTTP surface for the Teller demo.
//!
//! Thin glue over the routing core: a chat endpoint for the UI, the
//! fulfillment webhook the dialogue engine calls back into, and a health
//! probe. The chat endpoint is also the outermost safety net: a request
//! that fails completely becomes a single generic "connection failed" bot
//! message instead of an error page.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
