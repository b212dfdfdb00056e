//! Stock trading handlers.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{StockTradeRequest, StockTradeResponse};
use crate::app_state::AppState;
use crate::domain::{AccountId, TradeSide};
use crate::error::{ErrorResponse, ServiceError};

async fn trade(
    state: &AppState,
    id: uuid::Uuid,
    side: TradeSide,
    shares: u64,
) -> Result<StockTradeResponse, ServiceError> {
    let id = AccountId::from(id);
    let trade = state
        .economy
        .trade_stock(id, side, shares, Utc::now())
        .await?;
    let account = state.economy.account(id).await?;
    Ok(StockTradeResponse {
        side: trade.side,
        shares: trade.shares,
        price: trade.price,
        total: trade.total,
        shares_held: account.stock_shares,
        wallet: account.wallet,
    })
}

/// `POST /accounts/{id}/stock/buy`: buy shares.
///
/// # Errors
///
/// Returns [`ServiceError`] if the account is unknown, the share count is
/// zero or the wallet lacks spit.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{id}/stock/buy",
    tag = "Stock",
    summary = "Buy stock",
    description = "Buys shares at the current oscillator price, paid in spit.",
    params(
        ("id" = uuid::Uuid, Path, description = "Account UUID"),
    ),
    request_body = StockTradeRequest,
    responses(
        (status = 200, description = "Trade settled", body = StockTradeResponse),
        (status = 400, description = "Invalid share count", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 422, description = "Insufficient funds", body = ErrorResponse),
    )
)]
pub async fn buy_stock(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<StockTradeRequest>,
) -> Result<Json<StockTradeResponse>, ServiceError> {
    Ok(Json(trade(&state, id, TradeSide::Buy, req.shares).await?))
}

/// `POST /accounts/{id}/stock/sell`: sell shares.
///
/// # Errors
///
/// Returns [`ServiceError`] if the account is unknown, the share count is
/// zero or exceeds the shares held.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{id}/stock/sell",
    tag = "Stock",
    summary = "Sell stock",
    description = "Sells shares at the current oscillator price for spit.",
    params(
        ("id" = uuid::Uuid, Path, description = "Account UUID"),
    ),
    request_body = StockTradeRequest,
    responses(
        (status = 200, description = "Trade settled", body = StockTradeResponse),
        (status = 400, description = "Invalid share count", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 422, description = "Insufficient shares", body = ErrorResponse),
    )
)]
pub async fn sell_stock(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<StockTradeRequest>,
) -> Result<Json<StockTradeResponse>, ServiceError> {
    Ok(Json(trade(&state, id, TradeSide::Sell, req.shares).await?))
}

/// Stock routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/{id}/stock/buy", post(buy_stock))
        .route("/accounts/{id}/stock/sell", post(sell_stock))
}
