//! Chest DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ChestLootReward, Wallet};

/// Request body for `POST /accounts/{id}/chests/buy`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BuyChestsRequest {
    /// Number of chests to buy. Defaults to 1.
    #[serde(default = "default_count")]
    pub count: u32,
}

const fn default_count() -> u32 {
    1
}

/// Response body for `POST /accounts/{id}/chests/buy`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BuyChestsResponse {
    /// Chests bought.
    pub count: u32,
    /// Gold paid.
    pub total_cost: f64,
    /// Unopened chests now owned.
    pub chests_owned: u32,
    /// Wallet after payment.
    pub wallet: Wallet,
}

/// Response body for `POST /accounts/{id}/chests/open`.
#[derive(Debug, Serialize, ToSchema)]
pub struct OpenChestResponse {
    /// Rewards applied to the account.
    pub loot: Vec<ChestLootReward>,
    /// Unopened chests left.
    pub chests_remaining: u32,
    /// Wallet after credits and gold were added.
    pub wallet: Wallet,
}
