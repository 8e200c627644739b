//! Shared types, configuration, and errors for the Teller routing core.
//!
//! Every crate in the workspace depends on this one for the normalized
//! reply shape, conversation context model, and top-level configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::TellerConfig;
pub use error::{Result, TellerError};
pub use types::*;
