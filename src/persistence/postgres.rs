//! PostgreSQL implementation of the persistence layer.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{AccountSnapshot, StoredEvent};
use crate::domain::Account;
use crate::error::ServiceError;

/// PostgreSQL-backed persistence using a `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Wraps an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), ServiceError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ServiceError::PersistenceError(e.to_string()))
    }

    /// Appends an event to the log.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PersistenceError`] on database failure.
    pub async fn save_event(&self, event: &StoredEvent) -> Result<i64, ServiceError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO economy_events (account_id, event_type, payload, occurred_at) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(event.account_id)
        .bind(&event.event_type)
        .bind(&event.payload)
        .bind(event.occurred_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Stores the full state of one account.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PersistenceError`] on database failure, or
    /// [`ServiceError::Internal`] if the account cannot be serialized.
    pub async fn save_snapshot(&self, account: &Account) -> Result<i64, ServiceError> {
        let state_json =
            serde_json::to_value(account).map_err(|e| ServiceError::Internal(e.to_string()))?;
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO account_snapshots (account_id, state_json) VALUES ($1, $2) RETURNING id",
        )
        .bind(account.id.as_uuid())
        .bind(&state_json)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Loads the newest snapshot of every account.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PersistenceError`] on database failure.
    pub async fn load_latest_snapshots(&self) -> Result<Vec<AccountSnapshot>, ServiceError> {
        let rows = sqlx::query_as::<_, (i64, Uuid, serde_json::Value, DateTime<Utc>)>(
            "SELECT DISTINCT ON (account_id) id, account_id, state_json, snapshot_at \
             FROM account_snapshots ORDER BY account_id, snapshot_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, account_id, state_json, snapshot_at)| AccountSnapshot {
                id,
                account_id,
                state_json,
                snapshot_at,
            })
            .collect())
    }

    /// Deletes snapshots older than `before_days`, always keeping the newest
    /// snapshot of each account so it can still be restored.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PersistenceError`] on database failure.
    pub async fn delete_old_snapshots(&self, before_days: u64) -> Result<u64, ServiceError> {
        let cutoff = i64::try_from(before_days)
            .ok()
            .and_then(chrono::Duration::try_days)
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let result = sqlx::query(
            "DELETE FROM account_snapshots s WHERE s.snapshot_at < $1 \
             AND s.id NOT IN (SELECT DISTINCT ON (account_id) id FROM account_snapshots \
             ORDER BY account_id, snapshot_at DESC)",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
