//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tracing::warn;

use crate::sensor::EntityView;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/entities", get(list_entities))
        .route("/api/entities/:entity_id", get(get_entity))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Current view of every entity.
async fn list_entities(State(state): State<AppState>) -> Json<EntityListResponse> {
    let entities = state.platform.views().await;
    Json(EntityListResponse { entities })
}

/// Current view of one entity.
async fn get_entity(
    State(state): State<AppState>,
    Path(entity_id): Path<String>,
) -> Result<Json<EntityView>, AppError> {
    let entity = state
        .platform
        .find(&entity_id)
        .ok_or_else(|| AppError::NotFound {
            message: format!("Unknown entity: {entity_id}"),
        })?;

    Ok(Json(entity.view().await))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    NotFound { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        warn!(%status, "{message}");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
