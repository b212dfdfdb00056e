//! Account DTOs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Account, AccountId, ItemType, Wallet};

/// Request body for `POST /accounts`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OpenAccountRequest {
    /// Platform user ID to open the account for; generated when omitted.
    #[serde(default)]
    pub account_id: Option<AccountId>,
}

/// Public view of an account.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    /// Account identifier.
    pub account_id: AccountId,
    /// Spendable balances.
    pub wallet: Wallet,
    /// Unopened chests.
    pub chests: u32,
    /// Item counts by type.
    pub inventory: BTreeMap<ItemType, u32>,
    /// Stock shares held.
    pub stock_shares: u64,
    /// Total experience.
    pub xp: u64,
    /// Level derived from XP.
    pub level: u32,
    /// Number of open bank deposits.
    pub open_deposits: usize,
    /// Number of tickets bought.
    pub tickets: usize,
    /// Last paycheck claim.
    pub last_paycheck_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub last_modified_at: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id,
            wallet: account.wallet,
            chests: account.chests,
            inventory: account.inventory.clone(),
            stock_shares: account.stock_shares,
            xp: account.xp,
            level: account.level(),
            open_deposits: account.deposits.len(),
            tickets: account.tickets.len(),
            last_paycheck_at: account.last_paycheck_at,
            created_at: account.created_at,
            last_modified_at: account.last_modified_at,
        }
    }
}
