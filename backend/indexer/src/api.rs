//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::error;

use crate::db;
use crate::errors::IndexerError;
use crate::events::EventRecord;

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

/// All routes, without the CORS / tracing layers added in `main`.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", get(get_all_events))
        .route("/products/:upc/events", get(get_product_events))
        .route("/settlements/pending", get(get_pending_settlements))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ProductEventsResponse {
    pub upc: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct EventListResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Database failures surface as `500` with the error text.
pub struct ApiError(IndexerError);

impl From<IndexerError> for ApiError {
    fn from(e: IndexerError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("API request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /products/:upc/events`
///
/// Custody history of one product, oldest first.
pub async fn get_product_events(
    State(state): State<Arc<ApiState>>,
    Path(upc): Path<String>,
) -> Result<Json<ProductEventsResponse>, ApiError> {
    let events = db::get_events_for_upc(&state.pool, &upc).await?;
    Ok(Json(ProductEventsResponse {
        upc,
        count: events.len(),
        events,
    }))
}

/// `GET /events`
pub async fn get_all_events(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<EventListResponse>, ApiError> {
    let events = db::get_all_events(&state.pool).await?;
    Ok(Json(EventListResponse {
        count: events.len(),
        events,
    }))
}

/// `GET /settlements/pending`
///
/// Scheduled payouts still waiting for their `on_payout_complete` call.
pub async fn get_pending_settlements(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<EventListResponse>, ApiError> {
    let events = db::get_pending_settlements(&state.pool).await?;
    Ok(Json(EventListResponse {
        count: events.len(),
        events,
    }))
}
