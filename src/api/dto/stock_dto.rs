//! Stock trading DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{TradeSide, Wallet};

/// Request body for `POST /accounts/{id}/stock/buy` and `/sell`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StockTradeRequest {
    /// Number of shares.
    pub shares: u64,
}

/// Response body for a settled trade.
#[derive(Debug, Serialize, ToSchema)]
pub struct StockTradeResponse {
    /// Buy or sell.
    pub side: TradeSide,
    /// Shares traded.
    pub shares: u64,
    /// Price per share at execution.
    pub price: f64,
    /// Spit paid or received.
    pub total: f64,
    /// Shares held after the trade.
    pub shares_held: u64,
    /// Wallet after the trade.
    pub wallet: Wallet,
}
