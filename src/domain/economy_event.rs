//! Domain events reflecting account state changes.
//!
//! Every successful mutation emits an [`EconomyEvent`] through the
//! [`super::EventBus`]. Events fan out to WebSocket subscribers and, when
//! persistence is enabled, to the PostgreSQL event log.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::account::TradeSide;
use super::bank::CdTerm;
use super::chest::ChestLootReward;
use super::lottery::TicketKind;
use super::{AccountId, Currency};

/// Domain event emitted after every account mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum EconomyEvent {
    /// A new account was opened.
    AccountOpened {
        /// Account identifier.
        account_id: AccountId,
        /// Starting spit.
        spit: f64,
        /// Starting gold.
        gold: f64,
        /// Opening timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Wallet funds moved into a new deposit.
    Deposited {
        /// Account identifier.
        account_id: AccountId,
        /// New deposit.
        deposit_id: Uuid,
        /// Deposited currency.
        currency: Currency,
        /// Principal.
        amount: f64,
        /// Daily rate locked in.
        locked_rate: f64,
        /// Certificate term, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        term: Option<CdTerm>,
        /// Deposit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Bank funds moved back into the wallet.
    Withdrew {
        /// Account identifier.
        account_id: AccountId,
        /// Withdrawn currency.
        currency: Currency,
        /// Amount paid out.
        amount: f64,
        /// Withdrawal timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Dust deposits were removed.
    DustPurged {
        /// Account identifier.
        account_id: AccountId,
        /// Number of deposits removed.
        removed: usize,
        /// Number of consolidated deposits created.
        consolidated: usize,
        /// Purge timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A paycheck was deposited.
    PaycheckDeposited {
        /// Account identifier.
        account_id: AccountId,
        /// New deposit.
        deposit_id: Uuid,
        /// Spit deposited.
        amount: f64,
        /// Deposit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A lottery ticket was bought. The outcome is not included.
    TicketPurchased {
        /// Account identifier.
        account_id: AccountId,
        /// Ticket identifier.
        ticket_id: Uuid,
        /// Ticket tier.
        ticket_type: TicketKind,
        /// Price paid.
        cost: f64,
        /// Currency paid in.
        currency: Currency,
        /// Purchase timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A lottery ticket was scratched for the first time.
    TicketScratched {
        /// Account identifier.
        account_id: AccountId,
        /// Ticket identifier.
        ticket_id: Uuid,
        /// Whether the ticket won.
        is_winner: bool,
        /// Prize credited.
        prize_amount: f64,
        /// Prize currency.
        currency: Currency,
        /// Scratch timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Chests were bought with gold.
    ChestPurchased {
        /// Account identifier.
        account_id: AccountId,
        /// Chests bought.
        count: u32,
        /// Gold paid.
        total_cost: f64,
        /// Purchase timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A chest was opened.
    ChestOpened {
        /// Account identifier.
        account_id: AccountId,
        /// Loot applied to the account.
        loot: Vec<ChestLootReward>,
        /// Opening timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Stock shares were bought or sold.
    StockTraded {
        /// Account identifier.
        account_id: AccountId,
        /// Buy or sell.
        side: TradeSide,
        /// Shares traded.
        shares: u64,
        /// Price per share.
        price: f64,
        /// Spit paid or received.
        total: f64,
        /// Trade timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl EconomyEvent {
    /// Returns the account this event belongs to.
    #[must_use]
    pub const fn account_id(&self) -> AccountId {
        match self {
            Self::AccountOpened { account_id, .. }
            | Self::Deposited { account_id, .. }
            | Self::Withdrew { account_id, .. }
            | Self::DustPurged { account_id, .. }
            | Self::PaycheckDeposited { account_id, .. }
            | Self::TicketPurchased { account_id, .. }
            | Self::TicketScratched { account_id, .. }
            | Self::ChestPurchased { account_id, .. }
            | Self::ChestOpened { account_id, .. }
            | Self::StockTraded { account_id, .. } => *account_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::AccountOpened { .. } => "account_opened",
            Self::Deposited { .. } => "deposited",
            Self::Withdrew { .. } => "withdrew",
            Self::DustPurged { .. } => "dust_purged",
            Self::PaycheckDeposited { .. } => "paycheck_deposited",
            Self::TicketPurchased { .. } => "ticket_purchased",
            Self::TicketScratched { .. } => "ticket_scratched",
            Self::ChestPurchased { .. } => "chest_purchased",
            Self::ChestOpened { .. } => "chest_opened",
            Self::StockTraded { .. } => "stock_traded",
        }
    }

    /// Returns the event timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::AccountOpened { timestamp, .. }
            | Self::Deposited { timestamp, .. }
            | Self::Withdrew { timestamp, .. }
            | Self::DustPurged { timestamp, .. }
            | Self::PaycheckDeposited { timestamp, .. }
            | Self::TicketPurchased { timestamp, .. }
            | Self::TicketScratched { timestamp, .. }
            | Self::ChestPurchased { timestamp, .. }
            | Self::ChestOpened { timestamp, .. }
            | Self::StockTraded { timestamp, .. } => *timestamp,
        }
    }
}
