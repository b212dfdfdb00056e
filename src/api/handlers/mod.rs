//! REST endpoint handlers organized by resource.

pub mod account;
pub mod bank;
pub mod chest;
pub mod lottery;
pub mod market;
pub mod stock;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(market::routes())
        .merge(account::routes())
        .merge(bank::routes())
        .merge(lottery::routes())
        .merge(chest::routes())
        .merge(stock::routes())
}
