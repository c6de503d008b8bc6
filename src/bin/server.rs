//! CTS HTTP Server Binary
//!
//! This is the main entry point for the timetabling REST API server.
//! It initializes the repository, seeds the timeslot catalog, sets up the
//! HTTP router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin cts-server --features "local-repo,http-server"
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `CTS_CONFIG`: Path to a TOML engine configuration file (optional)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cts_rust::config::EngineConfig;
use cts_rust::db;
use cts_rust::http::{create_router, AppState};
use cts_rust::services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting CTS HTTP Server");

    // Resolve engine configuration
    let config = EngineConfig::from_env().map_err(anyhow::Error::msg)?;

    // Initialize global repository once and reuse it across the app
    db::init_repository().map_err(|e| anyhow::anyhow!(e))?;
    let repository = std::sync::Arc::clone(db::get_repository()?);
    info!("Repository initialized successfully");

    // A fresh repository needs the timeslot grid before anything can be
    // placed.
    let seeded = services::seed_timeslot_grid(repository.as_ref(), &config.search)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    if seeded > 0 {
        info!("Seeded {} timeslots", seeded);
    }

    // Create application state
    let state = AppState::new(repository, config);

    // Create router with all endpoints
    let app = create_router(state);

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);
    info!("API health probe: http://{}/health", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
