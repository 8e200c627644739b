//! Teller application binary - composition root.
//!
//! Ties the workspace crates together into a single executable:
//! 1. Parse CLI args and load configuration from TOML
//! 2. Initialize tracing
//! 3. Construct the HTTP adapter clients from config endpoints
//! 4. Wire the orchestrator and fulfillment handler over the mock bank
//! 5. Start the axum REST API server

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use teller_adapters::{HttpDialogueEngine, HttpIntentRecognizer, HttpKnowledgeSearch};
use teller_api::{start_server, AppState};
use teller_banking::MockBank;
use teller_core::config::TellerConfig;
use teller_core::error::TellerError;
use teller_fulfillment::FulfillmentHandler;
use teller_routing::Orchestrator;

mod cli;

#[tokio::main]
async fn main() -> Result<(), TellerError> {
    let args = cli::CliArgs::parse();

    let config_path = args.resolve_config_path();
    let config = TellerConfig::load_or_default(&config_path);

    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!(config = %config_path.display(), "Teller starting");

    // Backend clients, injected rather than constructed at use sites.
    let dialogue = HttpDialogueEngine::new(&config.dialogue)?;
    let intent = HttpIntentRecognizer::new(&config.intent, &config.routing.fallback_intent)?;
    let search = HttpKnowledgeSearch::new(&config.search)?;

    let orchestrator = Orchestrator::new(
        Arc::new(dialogue),
        Arc::new(intent),
        Arc::new(search),
        config.routing.clone(),
    );

    let bank = Arc::new(MockBank::new());
    let fulfillment = FulfillmentHandler::new(bank);

    let state = AppState::new(orchestrator, fulfillment);
    let port = args.resolve_port(config.api.port);

    start_server(port, state).await
}
