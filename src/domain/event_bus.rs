//! Broadcast channel for economy events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. The service
//! publishes an [`EconomyEvent`] after every mutation; WebSocket connections
//! and the persistence recorder each hold a receiver.

use tokio::sync::broadcast;

use super::EconomyEvent;

/// Broadcast bus for [`EconomyEvent`]s.
///
/// Lagging receivers lose the oldest events once the ring buffer is full.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EconomyEvent>,
}

impl EventBus {
    /// Creates a bus with room for `capacity` in-flight events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event, returning how many receivers got it.
    /// Without receivers the event is dropped.
    pub fn publish(&self, event: EconomyEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a receiver for all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EconomyEvent> {
        self.sender.subscribe()
    }

    /// Current number of receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{AccountId, Currency};
    use chrono::Utc;

    fn make_event(account_id: AccountId) -> EconomyEvent {
        EconomyEvent::Withdrew {
            account_id,
            currency: Currency::Spit,
            amount: 1.0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(make_event(AccountId::new())), 0);
    }

    #[tokio::test]
    async fn every_subscriber_sees_the_event() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let id = AccountId::new();
        assert_eq!(bus.publish(make_event(id)), 2);

        let Ok(e1) = rx1.recv().await else {
            panic!("rx1 failed");
        };
        let Ok(e2) = rx2.recv().await else {
            panic!("rx2 failed");
        };
        assert_eq!(e1.account_id(), id);
        assert_eq!(e2.account_id(), id);
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus = EventBus::new(16);
        let rx = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);
        drop(rx);
        assert_eq!(bus.receiver_count(), 0);
    }
}
