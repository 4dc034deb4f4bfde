// API Server Binary Entry Point
//
// Purpose: Load the engine snapshot and serve the hybrid compatibility API
// Usage: cargo run --features api --bin api_server

use hybrid_scorer_rust::{create_router, AppState, EngineConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "hybrid_scorer_rust=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    // Configuration from environment variables
    let config = EngineConfig::from_env();

    tracing::info!("Configuration:");
    tracing::info!("  DATA_DIR: {:?}", config.data_dir);
    tracing::info!("  MODEL_FILE: {:?}", config.model_file);
    tracing::info!("  TRAITS_FILE: {:?}", config.traits_file);
    tracing::info!("  SALINITY_FILE: {:?}", config.salinity_file);
    tracing::info!("  PLANTS_FILE: {:?}", config.plants_file);
    tracing::info!("  PORT: {}", config.port);

    // Load model, trait tables and search index before binding the port
    let state = AppState::new(&config).await?;
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
