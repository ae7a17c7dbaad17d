//! Floor-plan Project Server
//!
//! Holds one versioned document per project and relays accepted writes to
//! every subscriber of that project.
//!
//! ## Protocol
//!
//! Messages are JSON with the following format:
//! ```json
//! { "type": "subscribe", "project_id": "..." }
//! { "type": "write", "project": { ... }, "base_version": 3 }
//! { "type": "unsubscribe" }
//! ```
//! The server answers with `snapshot`, `update`, `accepted`, `conflict` and
//! `error` messages.

pub mod config;
pub mod http;
pub mod hub;
pub mod registry;
pub mod ws;

use axum::Router;
use axum::routing::get;
use floorplan_core::storage::ProjectStorage;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use hub::{HubError, ProjectHub};
pub use registry::SubscriberRegistry;

/// Shared application state
#[derive(Debug)]
pub struct AppState {
    pub hub: ProjectHub,
}

impl AppState {
    pub fn new(storage: Arc<dyn ProjectStorage>) -> Self {
        Self {
            hub: ProjectHub::new(storage),
        }
    }
}

/// All routes with CORS and request tracing.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(http::index))
        .route("/health", get(http::health))
        .route("/ws", get(ws::ws_handler))
        .route("/projects", get(http::list_projects).post(http::create_project))
        .route("/projects/{id}", get(http::get_project))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already bound listener until the process stops.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    axum::serve(listener, app(state)).await
}
