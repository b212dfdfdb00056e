//! Persistence layer: PostgreSQL event log and account snapshots.
//!
//! Optional at runtime. When enabled, accounts are restored from their
//! latest snapshots on startup, every event is appended to the log, and
//! snapshots are written periodically. Ticket purchases are also written
//! through [`AccountStore`] before they are acknowledged.

pub mod models;
pub mod postgres;
pub mod recorder;
pub mod store;

pub use postgres::PostgresPersistence;
pub use store::AccountStore;
