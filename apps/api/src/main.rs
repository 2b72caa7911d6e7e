mod config;
mod errors;
mod evaluation;
mod extraction;
mod interview;
mod llm_client;
mod models;
mod report;
mod routes;
mod state;
mod stats;
mod store;
mod telemetry;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::evaluation::rating::LlmRater;
use crate::evaluation::AnswerEvaluator;
use crate::interview::SessionRegistry;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::FileStore;
use crate::telemetry::TelemetrySimulator;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interviewer API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the JSON-file store
    let store = Arc::new(FileStore::open(config.data_dir.clone(), config.exports_dir.clone()).await?);
    info!(
        "Store ready (data: {}, exports: {})",
        config.data_dir.display(),
        config.exports_dir.display()
    );

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        config.anthropic_base_url.clone(),
    )?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let telemetry = Arc::new(TelemetrySimulator::new(Some(store.clone())));
    let evaluator = Arc::new(AnswerEvaluator::new(Arc::new(LlmRater(llm.clone()))));

    // Build app state
    let state = AppState {
        llm,
        config: config.clone(),
        sessions: Arc::new(SessionRegistry::new(store.clone())),
        store,
        telemetry: telemetry.clone(),
        evaluator,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    telemetry.shutdown().await;
    info!("Telemetry tasks stopped; bye");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
