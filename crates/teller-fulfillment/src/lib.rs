//! Fulfillment for the dialogue-engine webhook.
//!
//! The dialogue engine resolves an intent name and slot parameters, then
//! calls back into this handler to produce the concrete reply, any client
//! action, and the next set of conversation contexts. Contexts are threaded
//! explicitly: an immutable input slice in, an owned output list per branch.

pub mod context;
pub mod error;
pub mod handler;
pub mod params;

pub use error::FulfillmentError;
pub use handler::{FulfillmentHandler, FulfillmentResponse};
