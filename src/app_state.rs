//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::EconomyService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Economy service for all business logic.
    pub economy: Arc<EconomyService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Builds the state around a service, sharing its event bus.
    #[must_use]
    pub fn new(economy: Arc<EconomyService>) -> Self {
        let event_bus = economy.event_bus().clone();
        Self {
            economy,
            event_bus,
        }
    }
}
