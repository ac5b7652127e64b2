use crate::entity::Entity;
use crate::state::Registry;
use crate::telemetry::{Location, Timestamp};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Shared state for query API
pub struct QueryAppState {
    pub registry: Arc<Registry>,
    /// Seconds without movement before an entity is reported stationary
    pub stale_after_seconds: f64,
}

/// Entity response (mirrors the registry's Entity accessors)
#[derive(Debug, Serialize)]
pub struct EntityResponse {
    pub id: Uuid,
    pub location: Option<Location>,
    /// Meters per second
    pub speed: Option<f64>,
    #[serde(rename = "lastMovement")]
    pub last_movement: Option<String>,
    #[serde(rename = "lastReport")]
    pub last_report: Option<String>,
    pub stationary: bool,
}

impl EntityResponse {
    fn from_entity(entity: &Entity, now: Timestamp, stale_after_seconds: f64) -> Self {
        Self {
            id: entity.id(),
            location: entity.location(),
            speed: entity.speed().map(|s| s.meters_per_second()),
            last_movement: entity.last_movement().and_then(rfc3339),
            last_report: entity.last_report().and_then(rfc3339),
            stationary: entity.is_stationary(now, stale_after_seconds),
        }
    }
}

fn rfc3339(ts: Timestamp) -> Option<String> {
    ts.to_datetime().map(|dt| dt.to_rfc3339())
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create query API router
pub fn create_query_router(state: Arc<QueryAppState>) -> Router {
    Router::new()
        .route("/api/entities", get(list_entities))
        .route("/api/entities/:id", get(get_entity))
        .with_state(state)
}

/// GET /api/entities - List all entities in display order
async fn list_entities(State(state): State<Arc<QueryAppState>>) -> Json<Vec<EntityResponse>> {
    let now = Timestamp::now();

    let response = state
        .registry
        .enumerate()
        .iter()
        .map(|entity| EntityResponse::from_entity(entity, now, state.stale_after_seconds))
        .collect();

    Json(response)
}

/// GET /api/entities/:id - Get specific entity
async fn get_entity(
    State(state): State<Arc<QueryAppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<EntityResponse>, QueryError> {
    let entity = state.registry.find(id).ok_or(QueryError::NotFound)?;

    Ok(Json(EntityResponse::from_entity(
        &entity,
        Timestamp::now(),
        state.stale_after_seconds,
    )))
}

/// Query error types
#[derive(Debug)]
enum QueryError {
    NotFound,
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            QueryError::NotFound => (StatusCode::NOT_FOUND, "Entity not found"),
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
        });

        (status, body).into_response()
    }
}
