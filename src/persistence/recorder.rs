//! Background tasks tying the in-memory ledger to PostgreSQL.
//!
//! The event recorder drains the [`EventBus`] into the event log; the
//! snapshot task periodically writes every account and prunes old rows.
//! Both log failures and keep running: losing one write never stops the
//! economy.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::models::StoredEvent;
use super::postgres::PostgresPersistence;
use crate::domain::{AccountLedger, EventBus};

/// Loads the newest snapshot of every account into the ledger. Snapshots
/// that no longer decode are skipped with a warning.
///
/// # Errors
///
/// Returns an error if the snapshots cannot be read.
pub async fn restore_accounts(
    persistence: &PostgresPersistence,
    ledger: &AccountLedger,
) -> anyhow::Result<usize> {
    let snapshots = persistence
        .load_latest_snapshots()
        .await
        .context("loading account snapshots")?;

    let mut accounts = Vec::with_capacity(snapshots.len());
    for snapshot in snapshots {
        match snapshot.into_account() {
            Ok(account) => accounts.push(account),
            Err(e) => tracing::warn!(error = %e, "skipping unreadable snapshot"),
        }
    }
    Ok(ledger.restore(accounts).await)
}

/// Writes one snapshot of every account, returning how many were saved.
///
/// # Errors
///
/// Returns the first database error; accounts after it are not written.
pub async fn snapshot_all(
    persistence: &PostgresPersistence,
    ledger: &AccountLedger,
) -> anyhow::Result<usize> {
    let accounts = ledger.snapshot_all().await;
    for account in &accounts {
        persistence
            .save_snapshot(account)
            .await
            .with_context(|| format!("snapshotting account {}", account.id))?;
    }
    Ok(accounts.len())
}

/// Spawns the task that appends every published event to the event log.
#[must_use]
pub fn spawn_event_recorder(persistence: PostgresPersistence, bus: &EventBus) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let saved = match StoredEvent::from_event(&event) {
                        Ok(row) => persistence.save_event(&row).await,
                        Err(e) => Err(e),
                    };
                    if let Err(e) = saved {
                        tracing::error!(
                            error = %e,
                            account_id = %event.account_id(),
                            event_type = event.event_type_str(),
                            "failed to record event"
                        );
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event recorder lagged; events not recorded");
                }
                Err(RecvError::Closed) => break,
            }
        }
        tracing::info!("event recorder stopped");
    })
}

/// Spawns the periodic snapshot task. A `cleanup_after_days` of zero keeps
/// every snapshot.
#[must_use]
pub fn spawn_snapshot_task(
    persistence: PostgresPersistence,
    ledger: Arc<AccountLedger>,
    every: Duration,
    cleanup_after_days: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
        // The first tick completes immediately; the state was just restored.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match snapshot_all(&persistence, &ledger).await {
                Ok(count) => tracing::debug!(count, "accounts snapshotted"),
                Err(e) => tracing::error!(error = %format!("{e:#}"), "snapshot failed"),
            }
            if cleanup_after_days > 0 {
                match persistence.delete_old_snapshots(cleanup_after_days).await {
                    Ok(0) => {}
                    Ok(deleted) => tracing::info!(deleted, "old snapshots pruned"),
                    Err(e) => tracing::error!(error = %e, "snapshot cleanup failed"),
                }
            }
        }
    })
}
