//! Plain HTTP routes: banner, health and project listing/creation.

use crate::AppState;
use crate::hub::HubError;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use floorplan_core::{Project, ProjectSummary};
use serde::Deserialize;
use std::sync::Arc;

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let status = match &self {
            HubError::NotFound(_) => StatusCode::NOT_FOUND,
            HubError::Invalid(_) => StatusCode::BAD_REQUEST,
            HubError::Storage(e) => {
                tracing::error!("storage failure: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Index page
pub async fn index() -> &'static str {
    "Floor-plan Project Server - Connect via WebSocket at /ws"
}

/// Health check
pub async fn health() -> &'static str {
    "ok"
}

pub async fn list_projects(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ProjectSummary>>, HubError> {
    Ok(Json(state.hub.list().await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub name: String,
}

pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateProject>,
) -> Result<(StatusCode, Json<Project>), HubError> {
    let project = state.hub.create_project(&body.name).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Project>, HubError> {
    Ok(Json(state.hub.get(&id).await?))
}
