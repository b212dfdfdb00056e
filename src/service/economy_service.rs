//! Economy service: runs account operations and emits events.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use uuid::Uuid;

use crate::config::EconomySettings;
use crate::domain::{
    Account, AccountId, AccountLedger, CdTerm, ChestLootReward, Currency, Deposit, DustPurge,
    EconomyEvent, EventBus, LotteryTicket, MarketSnapshot, StockTrade, TicketKind, TradeSide,
    TtlCache,
};
use crate::error::ServiceError;
use crate::persistence::AccountStore;

/// Result of a ticket purchase.
#[derive(Debug, Clone)]
pub struct TicketPurchase {
    /// The ticket bought.
    pub ticket: LotteryTicket,
    /// `true` when an earlier purchase with the same idempotency key was
    /// returned instead of charging again.
    pub replayed: bool,
}

/// Orchestration layer for all economy operations.
///
/// Every mutation follows the same shape: take the account's write lock,
/// call one all-or-nothing [`Account`] method, release the lock, publish
/// the event and log it.
#[derive(Debug)]
pub struct EconomyService {
    ledger: Arc<AccountLedger>,
    event_bus: EventBus,
    settings: EconomySettings,
    rng: Mutex<StdRng>,
    purchases: Arc<dyn TtlCache<String, LotteryTicket>>,
    store: Option<Arc<dyn AccountStore>>,
}

impl EconomyService {
    /// Creates a service seeded from the OS random source.
    #[must_use]
    pub fn new(
        ledger: Arc<AccountLedger>,
        event_bus: EventBus,
        settings: EconomySettings,
        purchases: Arc<dyn TtlCache<String, LotteryTicket>>,
    ) -> Self {
        Self::with_rng(ledger, event_bus, settings, purchases, StdRng::from_os_rng())
    }

    /// Creates a service with a deterministic RNG.
    #[must_use]
    pub fn with_seed(
        ledger: Arc<AccountLedger>,
        event_bus: EventBus,
        settings: EconomySettings,
        purchases: Arc<dyn TtlCache<String, LotteryTicket>>,
        seed: u64,
    ) -> Self {
        Self::with_rng(
            ledger,
            event_bus,
            settings,
            purchases,
            StdRng::seed_from_u64(seed),
        )
    }

    fn with_rng(
        ledger: Arc<AccountLedger>,
        event_bus: EventBus,
        settings: EconomySettings,
        purchases: Arc<dyn TtlCache<String, LotteryTicket>>,
        rng: StdRng,
    ) -> Self {
        Self {
            ledger,
            event_bus,
            settings,
            rng: Mutex::new(rng),
            purchases,
            store: None,
        }
    }

    /// Writes ticket purchases through `store` before acknowledging them.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn AccountStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Returns the event bus.
    #[must_use]
    pub const fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns the account ledger.
    #[must_use]
    pub const fn ledger(&self) -> &Arc<AccountLedger> {
        &self.ledger
    }

    /// Returns the economy rules in force.
    #[must_use]
    pub const fn settings(&self) -> &EconomySettings {
        &self.settings
    }

    fn with_rng_locked<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    fn publish(&self, event: EconomyEvent) {
        let _ = self.event_bus.publish(event);
    }

    /// Market oscillators at `now`.
    #[must_use]
    pub fn market(&self, now: DateTime<Utc>) -> MarketSnapshot {
        MarketSnapshot::at(now)
    }

    /// Opens an account with the configured starting wallet. A random ID is
    /// generated when none is supplied.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AccountExists`] for a taken ID.
    pub async fn open_account(
        &self,
        id: Option<AccountId>,
        now: DateTime<Utc>,
    ) -> Result<Account, ServiceError> {
        let account = Account::new(
            id.unwrap_or_default(),
            self.settings.starting_spit,
            self.settings.starting_gold,
            now,
        );
        self.ledger.insert(account.clone()).await?;

        self.publish(EconomyEvent::AccountOpened {
            account_id: account.id,
            spit: account.wallet.spit,
            gold: account.wallet.gold,
            timestamp: now,
        });
        tracing::info!(account_id = %account.id, "account opened");
        Ok(account)
    }

    /// Current state of one account.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AccountNotFound`] for unknown IDs.
    pub async fn account(&self, id: AccountId) -> Result<Account, ServiceError> {
        let handle = self.ledger.get(id).await?;
        let account = handle.read().await.clone();
        Ok(account)
    }

    /// Deposits wallet funds, as a demand deposit or, with a `term`, as a
    /// certificate of deposit.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AccountNotFound`],
    /// [`ServiceError::InsufficientFunds`] or [`ServiceError::InvalidRequest`].
    pub async fn deposit(
        &self,
        id: AccountId,
        currency: Currency,
        amount: f64,
        term: Option<CdTerm>,
        now: DateTime<Utc>,
    ) -> Result<Deposit, ServiceError> {
        let handle = self.ledger.get(id).await?;
        let deposit = {
            let mut account = handle.write().await;
            match term {
                Some(term) => account.open_certificate(currency, amount, term, now)?,
                None => account.deposit(currency, amount, now)?,
            }
        };

        self.publish(EconomyEvent::Deposited {
            account_id: id,
            deposit_id: deposit.id,
            currency,
            amount,
            locked_rate: deposit.locked_rate,
            term,
            timestamp: now,
        });
        tracing::info!(account_id = %id, %currency, amount, rate = deposit.locked_rate, "deposited");
        Ok(deposit)
    }

    /// Withdraws matured bank funds into the wallet.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AccountNotFound`],
    /// [`ServiceError::InsufficientBankBalance`] or
    /// [`ServiceError::InvalidRequest`].
    pub async fn withdraw(
        &self,
        id: AccountId,
        currency: Currency,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<f64, ServiceError> {
        let handle = self.ledger.get(id).await?;
        let paid = handle.write().await.withdraw(currency, amount, now)?;

        self.publish(EconomyEvent::Withdrew {
            account_id: id,
            currency,
            amount: paid,
            timestamp: now,
        });
        tracing::info!(account_id = %id, %currency, amount = paid, "withdrew");
        Ok(paid)
    }

    /// Removes dust deposits using the configured threshold.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AccountNotFound`] or
    /// [`ServiceError::NothingToPurge`].
    pub async fn purge_dust(
        &self,
        id: AccountId,
        now: DateTime<Utc>,
    ) -> Result<DustPurge, ServiceError> {
        let handle = self.ledger.get(id).await?;
        let purge = handle
            .write()
            .await
            .purge_dust(self.settings.dust_threshold, now)?;

        self.publish(EconomyEvent::DustPurged {
            account_id: id,
            removed: purge.removed,
            consolidated: purge.consolidated.len(),
            timestamp: now,
        });
        tracing::info!(
            account_id = %id,
            removed = purge.removed,
            consolidated = purge.consolidated.len(),
            "dust purged"
        );
        Ok(purge)
    }

    /// Deposits the paycheck into the bank if the interval has elapsed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AccountNotFound`] or
    /// [`ServiceError::PaycheckNotReady`].
    pub async fn claim_paycheck(
        &self,
        id: AccountId,
        now: DateTime<Utc>,
    ) -> Result<Deposit, ServiceError> {
        let handle = self.ledger.get(id).await?;
        let deposit = handle.write().await.claim_paycheck(
            self.settings.paycheck_amount,
            self.settings.paycheck_interval(),
            now,
        )?;

        self.publish(EconomyEvent::PaycheckDeposited {
            account_id: id,
            deposit_id: deposit.id,
            amount: deposit.principal,
            timestamp: now,
        });
        tracing::info!(account_id = %id, amount = deposit.principal, "paycheck deposited");
        Ok(deposit)
    }

    /// Buys a ticket. With an idempotency key, a repeat of a recent purchase
    /// returns the original ticket without charging again.
    ///
    /// With a store attached, the account including the rolled outcome is
    /// persisted before the purchase is applied in memory.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AccountNotFound`],
    /// [`ServiceError::InsufficientFunds`] or, when the write-through fails,
    /// [`ServiceError::PersistenceError`] with the account left unchanged.
    pub async fn purchase_ticket(
        &self,
        id: AccountId,
        kind: TicketKind,
        idempotency_key: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TicketPurchase, ServiceError> {
        let handle = self.ledger.get(id).await?;
        let cache_key = idempotency_key.map(|key| format!("{id}:{key}"));

        let ticket = {
            let mut account = handle.write().await;
            if let Some(key) = &cache_key
                && let Some(ticket) = self.purchases.get(key)
            {
                tracing::debug!(account_id = %id, ticket_id = %ticket.id, "replayed ticket purchase");
                return Ok(TicketPurchase {
                    ticket,
                    replayed: true,
                });
            }
            let mut staged = account.clone();
            let ticket = self.with_rng_locked(|rng| staged.purchase_ticket(kind, now, rng))?;
            if let Some(store) = &self.store {
                store.save_account(&staged).await?;
            }
            *account = staged;
            if let Some(key) = cache_key {
                self.purchases
                    .put(key, ticket.clone(), self.settings.idempotency_ttl());
            }
            ticket
        };

        self.publish(EconomyEvent::TicketPurchased {
            account_id: id,
            ticket_id: ticket.id,
            ticket_type: kind,
            cost: ticket.cost,
            currency: ticket.currency,
            timestamp: now,
        });
        tracing::info!(account_id = %id, ticket_id = %ticket.id, %kind, "ticket purchased");
        Ok(TicketPurchase {
            ticket,
            replayed: false,
        })
    }

    /// All tickets of an account, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AccountNotFound`] for unknown IDs.
    pub async fn tickets(&self, id: AccountId) -> Result<Vec<LotteryTicket>, ServiceError> {
        let handle = self.ledger.get(id).await?;
        let tickets = handle.read().await.tickets.clone();
        Ok(tickets)
    }

    /// Reveals a ticket, crediting its prize on the first scratch.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AccountNotFound`] or
    /// [`ServiceError::TicketNotFound`].
    pub async fn scratch_ticket(
        &self,
        id: AccountId,
        ticket_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<LotteryTicket, ServiceError> {
        let handle = self.ledger.get(id).await?;
        let (ticket, first) = handle.write().await.scratch_ticket(ticket_id, now)?;

        if first {
            self.publish(EconomyEvent::TicketScratched {
                account_id: id,
                ticket_id,
                is_winner: ticket.is_winner,
                prize_amount: ticket.prize_amount,
                currency: ticket.currency,
                timestamp: now,
            });
            tracing::info!(
                account_id = %id,
                %ticket_id,
                is_winner = ticket.is_winner,
                prize = ticket.prize_amount,
                "ticket scratched"
            );
        }
        Ok(ticket)
    }

    /// Buys chests with gold, returning the gold spent and the chests now
    /// owned.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AccountNotFound`],
    /// [`ServiceError::InsufficientFunds`] or [`ServiceError::InvalidRequest`].
    pub async fn buy_chests(
        &self,
        id: AccountId,
        count: u32,
        now: DateTime<Utc>,
    ) -> Result<(f64, u32), ServiceError> {
        let handle = self.ledger.get(id).await?;
        let (total_cost, owned) = {
            let mut account = handle.write().await;
            let cost = account.buy_chests(count, self.settings.chest_cost_gold, now)?;
            (cost, account.chests)
        };

        self.publish(EconomyEvent::ChestPurchased {
            account_id: id,
            count,
            total_cost,
            timestamp: now,
        });
        tracing::info!(account_id = %id, count, total_cost, "chests purchased");
        Ok((total_cost, owned))
    }

    /// Opens one chest and applies its loot.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AccountNotFound`] or [`ServiceError::NoChests`].
    pub async fn open_chest(
        &self,
        id: AccountId,
        now: DateTime<Utc>,
    ) -> Result<Vec<ChestLootReward>, ServiceError> {
        let handle = self.ledger.get(id).await?;
        let loot = {
            let mut account = handle.write().await;
            self.with_rng_locked(|rng| account.open_chest(now, rng))?
        };

        self.publish(EconomyEvent::ChestOpened {
            account_id: id,
            loot: loot.clone(),
            timestamp: now,
        });
        tracing::info!(account_id = %id, rewards = loot.len(), "chest opened");
        Ok(loot)
    }

    /// Buys or sells stock at the current price.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AccountNotFound`],
    /// [`ServiceError::InsufficientFunds`], [`ServiceError::InsufficientShares`]
    /// or [`ServiceError::InvalidRequest`].
    pub async fn trade_stock(
        &self,
        id: AccountId,
        side: TradeSide,
        shares: u64,
        now: DateTime<Utc>,
    ) -> Result<StockTrade, ServiceError> {
        let handle = self.ledger.get(id).await?;
        let trade = {
            let mut account = handle.write().await;
            match side {
                TradeSide::Buy => account.buy_stock(shares, now)?,
                TradeSide::Sell => account.sell_stock(shares, now)?,
            }
        };

        self.publish(EconomyEvent::StockTraded {
            account_id: id,
            side,
            shares,
            price: trade.price,
            total: trade.total,
            timestamp: now,
        });
        tracing::info!(account_id = %id, ?side, shares, price = trade.price, "stock traded");
        Ok(trade)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use futures_util::FutureExt;
    use futures_util::future::BoxFuture;

    use super::*;
    use crate::domain::InMemoryTtlCache;
    use crate::persistence::models::AccountSnapshot;

    fn make_service() -> EconomyService {
        service_with(EconomySettings::default())
    }

    fn service_with(settings: EconomySettings) -> EconomyService {
        EconomyService::with_seed(
            Arc::new(AccountLedger::new()),
            EventBus::new(64),
            settings,
            Arc::new(InMemoryTtlCache::<String, LotteryTicket>::new(16)),
            7,
        )
    }

    /// Keeps every written account as a JSON snapshot row.
    #[derive(Debug, Default)]
    struct SnapshotStore {
        rows: Mutex<Vec<AccountSnapshot>>,
        offline: bool,
    }

    impl SnapshotStore {
        fn rows(&self) -> Vec<AccountSnapshot> {
            self.rows
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl AccountStore for SnapshotStore {
        fn save_account<'a>(
            &'a self,
            account: &'a Account,
        ) -> BoxFuture<'a, Result<(), ServiceError>> {
            let result = if self.offline {
                Err(ServiceError::PersistenceError("connection refused".to_string()))
            } else {
                serde_json::to_value(account)
                    .map_err(|e| ServiceError::Internal(e.to_string()))
                    .map(|state_json| {
                        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
                        let id = i64::try_from(rows.len()).unwrap_or(i64::MAX) + 1;
                        rows.push(AccountSnapshot {
                            id,
                            account_id: *account.id.as_uuid(),
                            state_json,
                            snapshot_at: account.last_modified_at,
                        });
                    })
            };
            futures_util::future::ready(result).boxed()
        }
    }

    async fn open(service: &EconomyService) -> AccountId {
        let Ok(account) = service.open_account(None, Utc::now()).await else {
            panic!("open failed");
        };
        account.id
    }

    #[tokio::test]
    async fn open_account_emits_event() {
        let service = make_service();
        let mut rx = service.event_bus().subscribe();
        let id = open(&service).await;

        let Ok(event) = rx.recv().await else {
            panic!("no event");
        };
        assert_eq!(event.account_id(), id);
        assert_eq!(event.event_type_str(), "account_opened");

        let Ok(account) = service.account(id).await else {
            panic!("account missing");
        };
        assert_eq!(account.wallet.spit, 1_000.0);
        assert_eq!(account.wallet.gold, 10.0);
    }

    #[tokio::test]
    async fn duplicate_account_id_conflicts() {
        let service = make_service();
        let id = open(&service).await;
        assert!(matches!(
            service.open_account(Some(id), Utc::now()).await,
            Err(ServiceError::AccountExists(_))
        ));
    }

    #[tokio::test]
    async fn unknown_account() {
        let service = make_service();
        assert!(matches!(
            service.withdraw(AccountId::new(), Currency::Spit, 1.0, Utc::now()).await,
            Err(ServiceError::AccountNotFound(_))
        ));
    }

    #[tokio::test]
    async fn deposit_and_withdraw() {
        let service = make_service();
        let id = open(&service).await;
        let now = Utc::now();

        assert!(
            service
                .deposit(id, Currency::Spit, 300.0, None, now)
                .await
                .is_ok()
        );
        let Ok(paid) = service.withdraw(id, Currency::Spit, 100.0, now).await else {
            panic!("withdraw failed");
        };
        assert_eq!(paid, 100.0);

        let Ok(account) = service.account(id).await else {
            panic!("account missing");
        };
        assert_eq!(account.wallet.spit, 800.0);
        assert!((account.bank_balance(Currency::Spit, now).total_balance - 200.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn idempotent_purchase_charges_once() {
        let service = make_service();
        let id = open(&service).await;
        let now = Utc::now();

        let Ok(first) = service
            .purchase_ticket(id, TicketKind::Quick, Some("abc"), now)
            .await
        else {
            panic!("first purchase failed");
        };
        let Ok(second) = service
            .purchase_ticket(id, TicketKind::Quick, Some("abc"), now)
            .await
        else {
            panic!("retry failed");
        };
        assert!(!first.replayed);
        assert!(second.replayed);
        assert_eq!(first.ticket.id, second.ticket.id);

        let Ok(account) = service.account(id).await else {
            panic!("account missing");
        };
        assert_eq!(account.tickets.len(), 1);
        assert_eq!(account.wallet.spit, 990.0);

        assert!(
            service
                .purchase_ticket(id, TicketKind::Quick, None, now)
                .await
                .is_ok()
        );
        let Ok(tickets) = service.tickets(id).await else {
            panic!("tickets missing");
        };
        assert_eq!(tickets.len(), 2);
    }

    #[tokio::test]
    async fn idempotency_keys_are_per_account() {
        let service = make_service();
        let a = open(&service).await;
        let b = open(&service).await;
        let now = Utc::now();

        let Ok(ta) = service
            .purchase_ticket(a, TicketKind::Penny, Some("k"), now)
            .await
        else {
            panic!("purchase a failed");
        };
        let Ok(tb) = service
            .purchase_ticket(b, TicketKind::Penny, Some("k"), now)
            .await
        else {
            panic!("purchase b failed");
        };
        assert!(!tb.replayed);
        assert_ne!(ta.ticket.id, tb.ticket.id);
    }

    #[tokio::test]
    async fn scratch_emits_once() {
        let service = make_service();
        let id = open(&service).await;
        let now = Utc::now();
        let Ok(purchase) = service
            .purchase_ticket(id, TicketKind::Penny, None, now)
            .await
        else {
            panic!("purchase failed");
        };

        let mut rx = service.event_bus().subscribe();
        let ticket_id = purchase.ticket.id;
        let Ok(first) = service.scratch_ticket(id, ticket_id, now).await else {
            panic!("scratch failed");
        };
        let Ok(second) = service.scratch_ticket(id, ticket_id, now).await else {
            panic!("rescratch failed");
        };
        assert_eq!(first.is_winner, second.is_winner);
        assert_eq!(first.prize_amount, second.prize_amount);

        let Ok(event) = rx.recv().await else {
            panic!("no scratch event");
        };
        assert_eq!(event.event_type_str(), "ticket_scratched");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn chests_and_stock() {
        let service = make_service();
        let id = open(&service).await;
        let now = Utc::now();

        let Ok((cost, owned)) = service.buy_chests(id, 2, now).await else {
            panic!("buy chests failed");
        };
        assert_eq!(cost, 10.0);
        assert_eq!(owned, 2);
        assert!(matches!(
            service.buy_chests(id, 1, now).await,
            Err(ServiceError::InsufficientFunds { .. })
        ));

        let Ok(loot) = service.open_chest(id, now).await else {
            panic!("open failed");
        };
        assert!((2..=3).contains(&loot.len()));

        let Ok(trade) = service.trade_stock(id, TradeSide::Buy, 2, now).await else {
            panic!("buy stock failed");
        };
        assert_eq!(trade.shares, 2);
        assert!(
            service
                .trade_stock(id, TradeSide::Sell, 2, now)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn paycheck_respects_interval() {
        let service = make_service();
        let id = open(&service).await;
        let now = Utc::now();
        assert!(service.claim_paycheck(id, now).await.is_ok());
        assert!(matches!(
            service.claim_paycheck(id, now).await,
            Err(ServiceError::PaycheckNotReady { .. })
        ));
    }

    #[tokio::test]
    async fn concurrent_withdrawals_never_overdraw() {
        let service = Arc::new(make_service());
        let id = open(&service).await;
        let now = Utc::now();
        let _ = service.deposit(id, Currency::Spit, 100.0, None, now).await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.withdraw(id, Currency::Spit, 30.0, now).await.is_ok()
            }));
        }
        let mut successes = 0;
        for handle in handles {
            if matches!(handle.await, Ok(true)) {
                successes += 1;
            }
        }
        assert_eq!(successes, 3);

        let Ok(account) = service.account(id).await else {
            panic!("account missing");
        };
        assert!((account.wallet.spit - 990.0).abs() < 1e-9);
        assert!((account.bank_balance(Currency::Spit, now).total_balance - 10.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn purchased_ticket_survives_restore_from_store() {
        let store = Arc::new(SnapshotStore::default());
        let service = make_service().with_store(Arc::clone(&store) as Arc<dyn AccountStore>);
        let id = open(&service).await;

        let Ok(purchase) = service
            .purchase_ticket(id, TicketKind::Lucky, None, Utc::now())
            .await
        else {
            panic!("purchase failed");
        };

        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        let restored = AccountLedger::new();
        let accounts: Vec<Account> = rows
            .into_iter()
            .filter_map(|row| row.into_account().ok())
            .collect();
        assert_eq!(restored.restore(accounts).await, 1);

        let Ok(handle) = restored.get(id).await else {
            panic!("account not restored");
        };
        let account = handle.read().await;
        let Some(ticket) = account.tickets.iter().find(|t| t.id == purchase.ticket.id) else {
            panic!("ticket not restored");
        };
        assert_eq!(ticket.is_winner, purchase.ticket.is_winner);
        assert_eq!(ticket.prize_amount, purchase.ticket.prize_amount);
        assert!(!ticket.scratched);
        assert_eq!(account.wallet.spit, 950.0);
    }

    #[tokio::test]
    async fn failed_write_through_leaves_account_untouched() {
        let store = Arc::new(SnapshotStore {
            offline: true,
            ..SnapshotStore::default()
        });
        let service = make_service().with_store(store as Arc<dyn AccountStore>);
        let id = open(&service).await;
        let mut rx = service.event_bus().subscribe();

        assert!(matches!(
            service
                .purchase_ticket(id, TicketKind::Quick, Some("k"), Utc::now())
                .await,
            Err(ServiceError::PersistenceError(_))
        ));

        let Ok(account) = service.account(id).await else {
            panic!("account missing");
        };
        assert_eq!(account.wallet.spit, 1_000.0);
        assert!(account.tickets.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unbounded_idempotency_ttl_still_charges_once() {
        let service = service_with(EconomySettings {
            idempotency_ttl_secs: u64::MAX,
            ..EconomySettings::default()
        });
        let id = open(&service).await;
        let now = Utc::now();

        let Ok(first) = service
            .purchase_ticket(id, TicketKind::Quick, Some("k"), now)
            .await
        else {
            panic!("purchase failed");
        };
        let Ok(retry) = service
            .purchase_ticket(id, TicketKind::Quick, Some("k"), now)
            .await
        else {
            panic!("retry failed");
        };
        assert!(retry.replayed);
        assert_eq!(first.ticket.id, retry.ticket.id);

        let Ok(account) = service.account(id).await else {
            panic!("account missing");
        };
        assert_eq!(account.wallet.spit, 990.0);
        assert_eq!(account.tickets.len(), 1);
    }

    #[tokio::test]
    async fn oversized_paycheck_interval_reports_not_ready() {
        let service = service_with(EconomySettings {
            paycheck_interval_hours: i64::MAX,
            ..EconomySettings::default()
        });
        let id = open(&service).await;
        let now = Utc::now();

        assert!(service.claim_paycheck(id, now).await.is_ok());
        let Err(ServiceError::PaycheckNotReady { retry_after_secs }) =
            service.claim_paycheck(id, now).await
        else {
            panic!("second paycheck should not be ready");
        };
        assert!(retry_after_secs > 0);
    }
}
