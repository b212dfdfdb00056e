//! System endpoints: health check and ticket tier catalog.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::TicketTierDto;
use crate::app_state::AppState;
use crate::domain::TicketKind;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health`: service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /config/ticket-tiers`: lottery ticket catalog.
#[utoipa::path(
    get,
    path = "/config/ticket-tiers",
    tag = "System",
    summary = "List ticket tiers",
    description = "Returns price, win chance and prize table of every lottery ticket tier.",
    responses(
        (status = 200, description = "Ticket tier catalog", body = Vec<TicketTierDto>),
    )
)]
pub async fn ticket_tiers_handler() -> impl IntoResponse {
    let tiers: Vec<TicketTierDto> = TicketKind::ALL.into_iter().map(TicketTierDto::from).collect();
    (StatusCode::OK, Json(tiers))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/ticket-tiers", get(ticket_tiers_handler))
}
