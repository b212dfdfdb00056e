//! Account handlers: open and inspect.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{AccountResponse, OpenAccountRequest};
use crate::app_state::AppState;
use crate::domain::AccountId;
use crate::error::{ErrorResponse, ServiceError};

/// `POST /accounts`: open an account.
///
/// # Errors
///
/// Returns [`ServiceError::AccountExists`] if the ID is already taken.
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    tag = "Accounts",
    summary = "Open an account",
    description = "Opens an economy account with the configured starting wallet. The body may carry the platform user ID; otherwise one is generated.",
    request_body = OpenAccountRequest,
    responses(
        (status = 201, description = "Account opened", body = AccountResponse),
        (status = 409, description = "Account already exists", body = ErrorResponse),
    )
)]
pub async fn open_account(
    State(state): State<AppState>,
    body: Option<Json<OpenAccountRequest>>,
) -> Result<impl IntoResponse, ServiceError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let account = state.economy.open_account(req.account_id, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(AccountResponse::from(&account))))
}

/// `GET /accounts/{id}`: account overview.
///
/// # Errors
///
/// Returns [`ServiceError::AccountNotFound`] for unknown IDs.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    tag = "Accounts",
    summary = "Get account",
    description = "Returns wallet balances, chests, inventory, stock shares, XP and level.",
    params(
        ("id" = uuid::Uuid, Path, description = "Account UUID"),
    ),
    responses(
        (status = 200, description = "Account overview", body = AccountResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
    )
)]
pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<AccountResponse>, ServiceError> {
    let account = state.economy.account(AccountId::from(id)).await?;
    Ok(Json(AccountResponse::from(&account)))
}

/// Account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(open_account))
        .route("/accounts/{id}", get(get_account))
}
