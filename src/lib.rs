//! # spitr-economy
//!
//! Economy service of the SPITr microblogging platform: a bank paying simple
//! interest at a time-oscillating daily rate, a stock with an oscillating
//! price, scratch-off lottery tickets and loot chests.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── EconomyService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── AccountLedger + Account (domain/)
//!     ├── Oscillators, interest, lottery and loot rolls (domain/)
//!     │
//!     └── PostgreSQL Persistence (optional)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
