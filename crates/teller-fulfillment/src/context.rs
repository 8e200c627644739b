//! Context hygiene helpers.
//!
//! Each fulfillment branch returns one of two shapes: every context
//! preserved, or everything cleared except the `authenticated` context.
//! Input contexts are never mutated in place.

use teller_core::types::Context;

/// Whether the context set carries a true `authenticated` flag.
pub fn is_authenticated(contexts: &[Context]) -> bool {
    contexts.iter().any(Context::grants_auth)
}

/// All contexts, preserved as-is.
pub fn keep_all(contexts: &[Context]) -> Vec<Context> {
    contexts.to_vec()
}

/// Only the `authenticated` context survives; all slot-filling state is
/// dropped so stale slots cannot leak into a new topic.
pub fn keep_only_auth(contexts: &[Context]) -> Vec<Context> {
    contexts
        .iter()
        .filter(|c| c.grants_auth())
        .cloned()
        .collect()
}
