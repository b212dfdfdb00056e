//! Lottery handlers: buy, list and scratch tickets.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    PurchaseTicketRequest, PurchaseTicketResponse, ScratchResponse, TicketListResponse, TicketView,
};
use crate::app_state::AppState;
use crate::domain::{AccountId, TicketKind};
use crate::error::{ErrorResponse, ServiceError};

/// Header carrying the client's idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

fn idempotency_key(headers: &HeaderMap) -> Result<Option<&str>, ServiceError> {
    let Some(value) = headers.get(IDEMPOTENCY_KEY_HEADER) else {
        return Ok(None);
    };
    let key = value
        .to_str()
        .map_err(|_| ServiceError::InvalidRequest("Idempotency-Key must be ASCII".to_string()))?
        .trim();
    if key.is_empty() || key.len() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(ServiceError::InvalidRequest(format!(
            "Idempotency-Key must be 1 to {MAX_IDEMPOTENCY_KEY_LEN} characters"
        )));
    }
    Ok(Some(key))
}

/// `POST /accounts/{id}/tickets`: buy a ticket.
///
/// # Errors
///
/// Returns [`ServiceError`] for unknown tiers or accounts, a malformed
/// idempotency key, or a wallet that cannot cover the price.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{id}/tickets",
    tag = "Lottery",
    summary = "Buy a ticket",
    description = "Charges the ticket price and rolls the outcome, which stays hidden until the ticket is scratched. Send an `Idempotency-Key` header to make retries safe: a repeat returns the original ticket without charging again.",
    params(
        ("id" = uuid::Uuid, Path, description = "Account UUID"),
        ("Idempotency-Key" = Option<String>, Header, description = "Client key for safe retries"),
    ),
    request_body = PurchaseTicketRequest,
    responses(
        (status = 201, description = "Ticket bought", body = PurchaseTicketResponse),
        (status = 200, description = "Earlier purchase replayed", body = PurchaseTicketResponse),
        (status = 400, description = "Unknown tier or bad key", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 422, description = "Insufficient funds", body = ErrorResponse),
    )
)]
pub async fn purchase_ticket(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    headers: HeaderMap,
    Json(req): Json<PurchaseTicketRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let kind: TicketKind = req.ticket_type.parse()?;
    let key = idempotency_key(&headers)?;
    let purchase = state
        .economy
        .purchase_ticket(AccountId::from(id), kind, key, Utc::now())
        .await?;

    let status = if purchase.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(PurchaseTicketResponse {
            ticket: TicketView::from(&purchase.ticket),
            replayed: purchase.replayed,
        }),
    ))
}

/// `GET /accounts/{id}/tickets`: list tickets.
///
/// # Errors
///
/// Returns [`ServiceError::AccountNotFound`] for unknown IDs.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}/tickets",
    tag = "Lottery",
    summary = "List tickets",
    description = "Returns every ticket of the account. Outcomes appear only on scratched tickets.",
    params(
        ("id" = uuid::Uuid, Path, description = "Account UUID"),
    ),
    responses(
        (status = 200, description = "Tickets", body = TicketListResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
    )
)]
pub async fn list_tickets(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<TicketListResponse>, ServiceError> {
    let tickets = state.economy.tickets(AccountId::from(id)).await?;
    Ok(Json(TicketListResponse {
        tickets: tickets.iter().map(TicketView::from).collect(),
    }))
}

/// `POST /accounts/{id}/tickets/{ticket_id}/scratch`: reveal a ticket.
///
/// # Errors
///
/// Returns [`ServiceError`] if the account or ticket is unknown.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{id}/tickets/{ticket_id}/scratch",
    tag = "Lottery",
    summary = "Scratch a ticket",
    description = "Reveals the stored outcome. The prize is credited on the first scratch only; scratching again returns the same result.",
    params(
        ("id" = uuid::Uuid, Path, description = "Account UUID"),
        ("ticket_id" = uuid::Uuid, Path, description = "Ticket UUID"),
    ),
    responses(
        (status = 200, description = "Ticket revealed", body = ScratchResponse),
        (status = 404, description = "Account or ticket not found", body = ErrorResponse),
    )
)]
pub async fn scratch_ticket(
    State(state): State<AppState>,
    Path((id, ticket_id)): Path<(uuid::Uuid, uuid::Uuid)>,
) -> Result<Json<ScratchResponse>, ServiceError> {
    let id = AccountId::from(id);
    let ticket = state
        .economy
        .scratch_ticket(id, ticket_id, Utc::now())
        .await?;
    let wallet = state.economy.account(id).await?.wallet;
    Ok(Json(ScratchResponse {
        ticket: TicketView::from(&ticket),
        wallet,
    }))
}

/// Lottery routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/accounts/{id}/tickets",
            post(purchase_ticket).get(list_tickets),
        )
        .route(
            "/accounts/{id}/tickets/{ticket_id}/scratch",
            post(scratch_ticket),
        )
}
