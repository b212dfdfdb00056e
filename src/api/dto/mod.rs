//! Data Transfer Objects for REST request/response serialization.
//!
//! Amounts are plain JSON numbers. Views are computed at request time, so
//! interest and remaining balances are always current.

pub mod account_dto;
pub mod bank_dto;
pub mod chest_dto;
pub mod lottery_dto;
pub mod stock_dto;

pub use account_dto::*;
pub use bank_dto::*;
pub use chest_dto::*;
pub use lottery_dto::*;
pub use stock_dto::*;
