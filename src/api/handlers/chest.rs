//! Chest handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{BuyChestsRequest, BuyChestsResponse, OpenChestResponse};
use crate::app_state::AppState;
use crate::domain::AccountId;
use crate::error::{ErrorResponse, ServiceError};

/// `POST /accounts/{id}/chests/buy`: buy chests with gold.
///
/// # Errors
///
/// Returns [`ServiceError`] if the account is unknown, the count is zero or
/// the wallet lacks gold.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{id}/chests/buy",
    tag = "Chests",
    summary = "Buy chests",
    description = "Buys `count` chests at the configured gold price each.",
    params(
        ("id" = uuid::Uuid, Path, description = "Account UUID"),
    ),
    request_body = BuyChestsRequest,
    responses(
        (status = 201, description = "Chests bought", body = BuyChestsResponse),
        (status = 400, description = "Invalid count", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 422, description = "Insufficient gold", body = ErrorResponse),
    )
)]
pub async fn buy_chests(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<BuyChestsRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = AccountId::from(id);
    let (total_cost, chests_owned) = state.economy.buy_chests(id, req.count, Utc::now()).await?;
    let wallet = state.economy.account(id).await?.wallet;
    Ok((
        StatusCode::CREATED,
        Json(BuyChestsResponse {
            count: req.count,
            total_cost,
            chests_owned,
            wallet,
        }),
    ))
}

/// `POST /accounts/{id}/chests/open`: open one chest.
///
/// # Errors
///
/// Returns [`ServiceError::NoChests`] when the account owns no chest.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{id}/chests/open",
    tag = "Chests",
    summary = "Open a chest",
    description = "Consumes one chest and applies two or three rolled rewards: credits go to spit, gold to gold and items to the inventory.",
    params(
        ("id" = uuid::Uuid, Path, description = "Account UUID"),
    ),
    responses(
        (status = 200, description = "Chest opened", body = OpenChestResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 422, description = "No chests", body = ErrorResponse),
    )
)]
pub async fn open_chest(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<OpenChestResponse>, ServiceError> {
    let id = AccountId::from(id);
    let loot = state.economy.open_chest(id, Utc::now()).await?;
    let account = state.economy.account(id).await?;
    Ok(Json(OpenChestResponse {
        loot,
        chests_remaining: account.chests,
        wallet: account.wallet,
    }))
}

/// Chest routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/{id}/chests/buy", post(buy_chests))
        .route("/accounts/{id}/chests/open", post(open_chest))
}
