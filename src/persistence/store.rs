//! Write-through seam for account state that must be durable before a
//! request is acknowledged.

use std::fmt;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use super::PostgresPersistence;
use crate::domain::Account;
use crate::error::ServiceError;

/// Durable store for full account state.
///
/// The service writes through it for operations whose result must survive a
/// restart, such as a ticket whose outcome was just rolled.
pub trait AccountStore: Send + Sync + fmt::Debug {
    /// Persists the complete state of `account`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PersistenceError`] when the write fails.
    fn save_account<'a>(&'a self, account: &'a Account) -> BoxFuture<'a, Result<(), ServiceError>>;
}

impl AccountStore for PostgresPersistence {
    fn save_account<'a>(&'a self, account: &'a Account) -> BoxFuture<'a, Result<(), ServiceError>> {
        async move {
            let snapshot_id = self.save_snapshot(account).await?;
            tracing::debug!(account_id = %account.id, snapshot_id, "account written through");
            Ok(())
        }
        .boxed()
    }
}
