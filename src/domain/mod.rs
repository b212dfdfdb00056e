//! Domain layer: economy rules, account state and the event system.
//!
//! The pure calculators (market oscillators, interest accrual, lottery and
//! loot rolls) are free functions over plain values. [`Account`] composes
//! them into all-or-nothing mutations, [`AccountLedger`] stores accounts
//! behind per-account locks, and [`EventBus`] broadcasts what changed.

pub mod account;
pub mod account_id;
pub mod bank;
pub mod cache;
pub mod chest;
pub mod currency;
pub mod economy_event;
pub mod event_bus;
pub mod ledger;
pub mod lottery;
pub mod market;
pub mod xp;

pub use account::{Account, DustPurge, StockTrade, TradeSide, Wallet};
pub use account_id::AccountId;
pub use bank::{BankBalance, CdTerm, Deposit};
pub use cache::{InMemoryTtlCache, TtlCache};
pub use chest::{ChestLootReward, ItemType, LootKind, Rarity};
pub use currency::Currency;
pub use economy_event::EconomyEvent;
pub use event_bus::EventBus;
pub use ledger::{AccountHandle, AccountLedger};
pub use lottery::{LotteryTicket, TicketKind, TicketOutcome, TierDefinition};
pub use market::MarketSnapshot;
pub use xp::XpAction;
