//! Per-connection subscription filter.
//!
//! Tracks which accounts a WebSocket client follows. The wildcard `"*"`
//! follows every account, which is how admin dashboards watch the whole
//! economy.

use std::collections::HashSet;

use crate::domain::AccountId;

/// Wildcard entry meaning "every account".
pub const WILDCARD: &str = "*";

/// Account subscriptions of a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    account_ids: HashSet<AccountId>,
    all: bool,
}

/// Account IDs parsed from a subscribe/unsubscribe list.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedTargets {
    /// Well-formed account IDs.
    pub ids: Vec<AccountId>,
    /// Whether the wildcard was present.
    pub wildcard: bool,
    /// Entries that were neither a UUID nor the wildcard.
    pub rejected: Vec<String>,
}

impl ParsedTargets {
    /// Splits raw entries into IDs, the wildcard and rejects.
    #[must_use]
    pub fn parse(raw: &[String]) -> Self {
        let mut parsed = Self::default();
        for entry in raw {
            if entry == WILDCARD {
                parsed.wildcard = true;
            } else if let Ok(uuid) = entry.parse::<uuid::Uuid>() {
                parsed.ids.push(AccountId::from_uuid(uuid));
            } else {
                parsed.rejected.push(entry.clone());
            }
        }
        parsed
    }
}

impl SubscriptionManager {
    /// Creates a manager that matches nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Follows `targets`.
    pub fn subscribe(&mut self, targets: &ParsedTargets) {
        self.all |= targets.wildcard;
        self.account_ids.extend(targets.ids.iter().copied());
    }

    /// Stops following `targets`; the wildcard entry turns the wildcard off.
    pub fn unsubscribe(&mut self, targets: &ParsedTargets) {
        if targets.wildcard {
            self.all = false;
        }
        for id in &targets.ids {
            self.account_ids.remove(id);
        }
    }

    /// Returns `true` if events of `account_id` should be forwarded.
    #[must_use]
    pub fn matches(&self, account_id: AccountId) -> bool {
        self.all || self.account_ids.contains(&account_id)
    }

    /// Number of explicitly followed accounts.
    #[must_use]
    pub fn count(&self) -> usize {
        self.account_ids.len()
    }

    /// Returns `true` while the wildcard is active.
    #[must_use]
    pub const fn is_subscribed_all(&self) -> bool {
        self.all
    }
}
