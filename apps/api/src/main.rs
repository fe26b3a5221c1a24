mod config;
mod errors;
mod extraction;
mod matching;
mod models;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::matching::composite::{CandidateScorer, TfIdfSkillScorer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on values that do not parse)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HireMatch API v{}", env!("CARGO_PKG_VERSION"));

    std::fs::create_dir_all(&config.scratch_dir).with_context(|| {
        format!("creating scratch dir {}", config.scratch_dir.display())
    })?;
    info!(
        "Scratch dir: {} (max {} concurrent extractions, {}s timeout)",
        config.scratch_dir.display(),
        config.max_concurrent_extractions,
        config.extraction_timeout_secs
    );

    // Initialize candidate scorer (TF-IDF similarity plus skill coverage)
    let scorer: Arc<dyn CandidateScorer> = Arc::new(TfIdfSkillScorer::default());
    info!("Candidate scorer: {}", scorer.backend());

    let state = AppState::new(config.clone(), scorer);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
