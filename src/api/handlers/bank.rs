//! Bank handlers: balances, deposits, withdrawals, dust purge, paychecks.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    BankResponse, DepositRequest, DepositResponse, PaycheckResponse, PurgeDustResponse,
    WithdrawRequest, WithdrawResponse,
};
use crate::app_state::AppState;
use crate::domain::AccountId;
use crate::error::{ErrorResponse, ServiceError};

/// `GET /accounts/{id}/bank`: balances and deposits.
///
/// # Errors
///
/// Returns [`ServiceError::AccountNotFound`] for unknown IDs.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}/bank",
    tag = "Bank",
    summary = "Get bank balances",
    description = "Returns per-currency principal, accrued interest and balance, plus every open deposit evaluated now.",
    params(
        ("id" = uuid::Uuid, Path, description = "Account UUID"),
    ),
    responses(
        (status = 200, description = "Bank overview", body = BankResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
    )
)]
pub async fn get_bank(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<BankResponse>, ServiceError> {
    let account = state.economy.account(AccountId::from(id)).await?;
    Ok(Json(BankResponse::at(&account, Utc::now())))
}

/// `POST /accounts/{id}/bank/deposit`: deposit wallet funds.
///
/// # Errors
///
/// Returns [`ServiceError`] if the account is unknown, the amount is invalid
/// or the wallet cannot cover it.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{id}/bank/deposit",
    tag = "Bank",
    summary = "Deposit",
    description = "Moves wallet funds into a deposit that locks the current daily rate. With `term`, opens a certificate of deposit that earns a bonus rate but cannot be withdrawn before it matures.",
    params(
        ("id" = uuid::Uuid, Path, description = "Account UUID"),
    ),
    request_body = DepositRequest,
    responses(
        (status = 201, description = "Deposit created", body = DepositResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 422, description = "Insufficient funds", body = ErrorResponse),
    )
)]
pub async fn deposit(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<DepositRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = AccountId::from(id);
    let deposit = state
        .economy
        .deposit(id, req.currency, req.amount, req.term, Utc::now())
        .await?;
    let wallet = state.economy.account(id).await?.wallet;
    Ok((StatusCode::CREATED, Json(DepositResponse { deposit, wallet })))
}

/// `POST /accounts/{id}/bank/withdraw`: withdraw to the wallet.
///
/// # Errors
///
/// Returns [`ServiceError`] if the account is unknown, the amount is invalid
/// or exceeds the withdrawable balance.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{id}/bank/withdraw",
    tag = "Bank",
    summary = "Withdraw",
    description = "Withdraws from matured deposits, oldest first, into the wallet. Deposits drained to zero are closed.",
    params(
        ("id" = uuid::Uuid, Path, description = "Account UUID"),
    ),
    request_body = WithdrawRequest,
    responses(
        (status = 200, description = "Withdrawal paid", body = WithdrawResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 422, description = "Insufficient bank balance", body = ErrorResponse),
    )
)]
pub async fn withdraw(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<WithdrawRequest>,
) -> Result<Json<WithdrawResponse>, ServiceError> {
    let id = AccountId::from(id);
    let amount = state
        .economy
        .withdraw(id, req.currency, req.amount, Utc::now())
        .await?;
    let wallet = state.economy.account(id).await?.wallet;
    Ok(Json(WithdrawResponse {
        currency: req.currency,
        amount,
        wallet,
    }))
}

/// `POST /accounts/{id}/bank/purge-dust`: clean up dust deposits.
///
/// # Errors
///
/// Returns [`ServiceError::NothingToPurge`] when no deposit is dust.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{id}/bank/purge-dust",
    tag = "Bank",
    summary = "Purge dust deposits",
    description = "Removes deposits whose remaining balance is below the dust threshold. Per currency the dust is redeposited as one deposit, or credited to the wallet if still below the threshold.",
    params(
        ("id" = uuid::Uuid, Path, description = "Account UUID"),
    ),
    responses(
        (status = 200, description = "Dust purged", body = PurgeDustResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 422, description = "Nothing to purge", body = ErrorResponse),
    )
)]
pub async fn purge_dust(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<PurgeDustResponse>, ServiceError> {
    let purge = state
        .economy
        .purge_dust(AccountId::from(id), Utc::now())
        .await?;
    Ok(Json(PurgeDustResponse::from(purge)))
}

/// `POST /accounts/{id}/bank/paycheck`: deposit the paycheck.
///
/// # Errors
///
/// Returns [`ServiceError::PaycheckNotReady`] inside the paycheck interval.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{id}/bank/paycheck",
    tag = "Bank",
    summary = "Claim paycheck",
    description = "Deposits the paycheck straight into the bank at the current rate. Allowed once per paycheck interval.",
    params(
        ("id" = uuid::Uuid, Path, description = "Account UUID"),
    ),
    responses(
        (status = 201, description = "Paycheck deposited", body = PaycheckResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 422, description = "Paycheck not ready", body = ErrorResponse),
    )
)]
pub async fn claim_paycheck(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let now = Utc::now();
    let deposit = state
        .economy
        .claim_paycheck(AccountId::from(id), now)
        .await?;
    let next_paycheck_at = now + state.economy.settings().paycheck_interval();
    Ok((
        StatusCode::CREATED,
        Json(PaycheckResponse {
            deposit,
            next_paycheck_at,
        }),
    ))
}

/// Bank routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/{id}/bank", get(get_bank))
        .route("/accounts/{id}/bank/deposit", post(deposit))
        .route("/accounts/{id}/bank/withdraw", post(withdraw))
        .route("/accounts/{id}/bank/purge-dust", post(purge_dust))
        .route("/accounts/{id}/bank/paycheck", post(claim_paycheck))
}
