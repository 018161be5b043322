mod config;
mod db;
mod documents;
mod errors;
mod jobs;
mod llm_client;
mod models;
mod optimization;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{GenerationClient, GenerationSettings};
use crate::optimization::analyzer::{KeywordProfileAnalyzer, LlmProfileAnalyzer, ProfileAnalyzer};
use crate::routes::build_router;
use crate::state::AppState;

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

    info!("Starting JobGenie API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize generation client
    let client = GenerationClient::new(GenerationSettings::from_config(&config))?;
    info!(
        "Generation client initialized (model: {}, base url: {})",
        client.model(),
        config.generation_api_url
    );

    // Keyword analyzer by default; ENABLE_LLM_PROFILE_ANALYSIS swaps in the remote one
    let analyzer: Arc<dyn ProfileAnalyzer> = if config.enable_llm_profile_analysis {
        Arc::new(LlmProfileAnalyzer(client.clone()))
    } else {
        Arc::new(KeywordProfileAnalyzer)
    };
    info!("Profile analyzer: {}", analyzer.backend());

    let shutdown = CancellationToken::new();

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        generator: Arc::new(client),
        analyzer,
        shutdown: shutdown.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // In-flight optimization runs stop before their next pass.
            shutdown.cancel();
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
