//! Service layer: business logic orchestration.
//!
//! [`EconomyService`] runs account operations under per-account locks and
//! emits events through the [`super::domain::EventBus`].

pub mod economy_service;

pub use economy_service::{EconomyService, TicketPurchase};
