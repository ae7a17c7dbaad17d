//! Floor-plan project server binary.

use floorplan_server::config::StorageBackend;
use floorplan_server::{AppState, ServerConfig};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "floorplan_server=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let storage = config.open_storage()?;
    match &config.storage {
        StorageBackend::Memory => info!("Projects are kept in memory"),
        StorageBackend::DefaultDir => info!("Storing projects in the user data directory"),
        StorageBackend::Dir(dir) => info!("Storing projects in {}", dir.display()),
    }

    let state = Arc::new(AppState::new(storage));
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("Floor-plan server listening on {}", config.addr);
    info!("WebSocket endpoint: ws://{}/ws", config.addr);

    floorplan_server::serve(listener, state).await?;
    Ok(())
}
