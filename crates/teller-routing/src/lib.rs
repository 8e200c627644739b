//! Request routing for Teller.
//!
//! Two pieces: a pure keyword classifier that buckets free text into a
//! coarse category, and the orchestrator that walks the backend waterfall
//! (dialogue engine for banking, intent service then knowledge search for
//! everything else) and returns one normalized reply shape.

pub mod classifier;
pub mod orchestrator;

pub use classifier::classify;
pub use orchestrator::Orchestrator;
