//! Application state shared across all route handlers.

use std::sync::Arc;

use teller_fulfillment::FulfillmentHandler;
use teller_routing::Orchestrator;

/// Shared application state, cheap to clone across handler tasks.
///
/// Both services are constructed by the host application with their
/// backend clients injected; handlers never build clients themselves.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub fulfillment: Arc<FulfillmentHandler>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, fulfillment: FulfillmentHandler) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            fulfillment: Arc::new(fulfillment),
        }
    }
}
