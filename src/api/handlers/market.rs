//! Market endpoint: current deposit rate and stock price.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::app_state::AppState;
use crate::domain::MarketSnapshot;

/// `GET /market`: current market oscillators.
#[utoipa::path(
    get,
    path = "/api/v1/market",
    tag = "Market",
    summary = "Market snapshot",
    description = "Returns the daily deposit rate and stock price right now, whether each is rising, and the hours until each reaches its next peak and trough.",
    responses(
        (status = 200, description = "Market snapshot", body = MarketSnapshot),
    )
)]
pub async fn get_market(State(state): State<AppState>) -> Json<MarketSnapshot> {
    Json(state.economy.market(Utc::now()))
}

/// Market routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/market", get(get_market))
}
