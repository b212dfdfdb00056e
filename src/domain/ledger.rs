//! Concurrent account storage with per-account locking.
//!
//! [`AccountLedger`] keeps every open account in a `HashMap` whose entries
//! are individually guarded by a [`tokio::sync::RwLock`]. Reads of one
//! account run concurrently, writes to different accounts run concurrently,
//! and writes to the same account are serialized. That last property is
//! what makes each [`Account`] mutation a transaction.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Account, AccountId};
use crate::error::ServiceError;

/// Shared handle to one account behind its own lock.
pub type AccountHandle = Arc<RwLock<Account>>;

/// Store of all open economy accounts.
#[derive(Debug, Default)]
pub struct AccountLedger {
    accounts: RwLock<HashMap<AccountId, AccountHandle>>,
}

impl AccountLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a freshly opened account.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AccountExists`] if the ID is already taken.
    pub async fn insert(&self, account: Account) -> Result<AccountHandle, ServiceError> {
        let id = account.id;
        let mut map = self.accounts.write().await;
        if map.contains_key(&id) {
            return Err(ServiceError::AccountExists(*id.as_uuid()));
        }
        let handle = Arc::new(RwLock::new(account));
        map.insert(id, Arc::clone(&handle));
        Ok(handle)
    }

    /// Looks up an account handle.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AccountNotFound`] for unknown IDs.
    pub async fn get(&self, id: AccountId) -> Result<AccountHandle, ServiceError> {
        let map = self.accounts.read().await;
        map.get(&id)
            .cloned()
            .ok_or(ServiceError::AccountNotFound(*id.as_uuid()))
    }

    /// Replaces the ledger contents with restored accounts, returning how
    /// many were loaded. Existing entries with the same ID are overwritten.
    pub async fn restore(&self, accounts: impl IntoIterator<Item = Account>) -> usize {
        let mut map = self.accounts.write().await;
        let mut restored = 0;
        for account in accounts {
            map.insert(account.id, Arc::new(RwLock::new(account)));
            restored += 1;
        }
        restored
    }

    /// Clones the current state of every account, for snapshotting.
    pub async fn snapshot_all(&self) -> Vec<Account> {
        let handles: Vec<AccountHandle> = self.accounts.read().await.values().cloned().collect();
        let mut accounts = Vec::with_capacity(handles.len());
        for handle in handles {
            accounts.push(handle.read().await.clone());
        }
        accounts
    }

    /// IDs of every open account.
    pub async fn ids(&self) -> Vec<AccountId> {
        self.accounts.read().await.keys().copied().collect()
    }

    /// Number of open accounts.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Returns `true` if no account is open.
    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}
