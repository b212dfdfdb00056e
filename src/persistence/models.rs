//! Database rows for the event log and account snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Account, EconomyEvent};
use crate::error::ServiceError;

/// A row of the `economy_events` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Auto-increment row ID.
    pub id: i64,
    /// Account the event belongs to.
    pub account_id: Uuid,
    /// Event type discriminator (e.g. `"deposited"`).
    pub event_type: String,
    /// Full serialized event.
    pub payload: serde_json::Value,
    /// When the event happened.
    pub occurred_at: DateTime<Utc>,
}

impl StoredEvent {
    /// Builds an unsaved row from a domain event.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Internal`] if the event cannot be serialized.
    pub fn from_event(event: &EconomyEvent) -> Result<Self, ServiceError> {
        let payload =
            serde_json::to_value(event).map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(Self {
            id: 0,
            account_id: *event.account_id().as_uuid(),
            event_type: event.event_type_str().to_string(),
            payload,
            occurred_at: event.timestamp(),
        })
    }
}

/// A row of the `account_snapshots` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Auto-increment row ID.
    pub id: i64,
    /// Account that was snapshotted.
    pub account_id: Uuid,
    /// Full account state.
    pub state_json: serde_json::Value,
    /// Snapshot timestamp.
    pub snapshot_at: DateTime<Utc>,
}

impl AccountSnapshot {
    /// Decodes the stored account state.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PersistenceError`] if the JSON no longer
    /// matches the account shape.
    pub fn into_account(self) -> Result<Account, ServiceError> {
        serde_json::from_value(self.state_json).map_err(|e| {
            ServiceError::PersistenceError(format!(
                "snapshot {} of account {}: {e}",
                self.id, self.account_id
            ))
        })
    }
}
