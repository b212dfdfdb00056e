//! Service error types with HTTP status code mapping.
//!
//! [`ServiceError`] is the central error type. Each variant maps to a numeric
//! code, an HTTP status and a structured JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Currency;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "message": "insufficient spit: need 10, have 4",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 Internal Server Error    |
/// | 4000–4999 | Economy rules   | 422 Unprocessable Entity     |
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown lottery ticket tier.
    #[error("invalid ticket kind: {0}")]
    InvalidTicketKind(String),

    /// Account with the given ID was not found.
    #[error("account not found: {0}")]
    AccountNotFound(uuid::Uuid),

    /// Ticket with the given ID does not belong to the account.
    #[error("ticket not found: {0}")]
    TicketNotFound(uuid::Uuid),

    /// Deposit with the given ID does not belong to the account.
    #[error("deposit not found: {0}")]
    DepositNotFound(uuid::Uuid),

    /// An account with the given ID is already open.
    #[error("account already exists: {0}")]
    AccountExists(uuid::Uuid),

    /// Wallet balance is too low.
    #[error("insufficient {currency}: need {needed}, have {available}")]
    InsufficientFunds {
        /// Currency being spent.
        currency: Currency,
        /// Amount required.
        needed: f64,
        /// Amount in the wallet.
        available: f64,
    },

    /// Withdrawable bank balance is too low.
    #[error("insufficient {currency} in bank: need {needed}, withdrawable {available}")]
    InsufficientBankBalance {
        /// Currency being withdrawn.
        currency: Currency,
        /// Amount requested.
        needed: f64,
        /// Amount currently withdrawable.
        available: f64,
    },

    /// The account owns no unopened chests.
    #[error("no chests to open")]
    NoChests,

    /// Not enough stock shares to sell.
    #[error("insufficient shares: need {needed}, have {available}")]
    InsufficientShares {
        /// Shares requested.
        needed: u64,
        /// Shares held.
        available: u64,
    },

    /// The paycheck interval has not elapsed yet.
    #[error("paycheck not ready; retry after {retry_after_secs} s")]
    PaycheckNotReady {
        /// Seconds until the next paycheck can be claimed.
        retry_after_secs: i64,
    },

    /// No deposit currently qualifies as dust.
    #[error("no dust deposits to purge")]
    NothingToPurge,

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidTicketKind(_) => 1002,
            Self::AccountNotFound(_) => 2001,
            Self::TicketNotFound(_) => 2002,
            Self::DepositNotFound(_) => 2003,
            Self::AccountExists(_) => 2004,
            Self::InsufficientFunds { .. } => 4001,
            Self::InsufficientBankBalance { .. } => 4002,
            Self::NoChests => 4003,
            Self::PaycheckNotReady { .. } => 4004,
            Self::NothingToPurge => 4005,
            Self::InsufficientShares { .. } => 4006,
            Self::PersistenceError(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidTicketKind(_) => StatusCode::BAD_REQUEST,
            Self::AccountNotFound(_) | Self::TicketNotFound(_) | Self::DepositNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::AccountExists(_) => StatusCode::CONFLICT,
            Self::InsufficientFunds { .. }
            | Self::InsufficientBankBalance { .. }
            | Self::NoChests
            | Self::InsufficientShares { .. }
            | Self::PaycheckNotReady { .. }
            | Self::NothingToPurge => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let details = match &self {
            Self::PaycheckNotReady { retry_after_secs } => {
                Some(format!("retry_after_secs={retry_after_secs}"))
            }
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
