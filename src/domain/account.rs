//! Per-account economy state and its atomic mutations.
//!
//! Every mutating method validates before it touches state, so a call either
//! applies completely or returns an error with the account unchanged. The
//! ledger hands these methods out under the account's write lock, which makes
//! each one a single transaction: there is no window between reading a
//! balance and writing it back.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::bank::{BankBalance, CdTerm, Deposit, sum_balances};
use super::chest::{ChestLootReward, ItemType, LootKind, roll_loot};
use super::lottery::{LotteryTicket, TicketKind, roll_outcome};
use super::market::{current_daily_rate, stock_price};
use super::xp::{XpAction, level_for_xp};
use super::{AccountId, Currency};
use crate::error::ServiceError;

/// Tolerance for float comparisons against balances.
const EPSILON: f64 = 1e-9;

/// Spendable balances outside the bank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Wallet {
    /// Spit on hand.
    pub spit: f64,
    /// Gold on hand.
    pub gold: f64,
}

impl Wallet {
    /// Balance held in `currency`.
    #[must_use]
    pub const fn get(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Spit => self.spit,
            Currency::Gold => self.gold,
        }
    }

    fn slot(&mut self, currency: Currency) -> &mut f64 {
        match currency {
            Currency::Spit => &mut self.spit,
            Currency::Gold => &mut self.gold,
        }
    }
}

/// What a dust purge did, per currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DustPurge {
    /// Number of dust deposits removed.
    pub removed: usize,
    /// Fresh deposits created from consolidated dust.
    pub consolidated: Vec<Deposit>,
    /// Dust too small to redeposit, credited to the wallet instead.
    pub credited_to_wallet: Vec<(Currency, f64)>,
}

/// Direction of a stock trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    /// Shares bought with spit.
    Buy,
    /// Shares sold for spit.
    Sell,
}

/// A settled stock trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StockTrade {
    /// Buy or sell.
    pub side: TradeSide,
    /// Number of shares traded.
    pub shares: u64,
    /// Price per share at execution.
    pub price: f64,
    /// Spit paid or received.
    pub total: f64,
}

/// Economy state of a single account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier.
    pub id: AccountId,
    /// Spendable balances.
    pub wallet: Wallet,
    /// Open bank deposits, oldest first.
    pub deposits: Vec<Deposit>,
    /// Purchased lottery tickets, oldest first.
    pub tickets: Vec<LotteryTicket>,
    /// Unopened chests.
    pub chests: u32,
    /// Item counts.
    pub inventory: BTreeMap<ItemType, u32>,
    /// Stock shares held.
    pub stock_shares: u64,
    /// Total experience.
    pub xp: u64,
    /// Last paycheck claim.
    pub last_paycheck_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub last_modified_at: DateTime<Utc>,
}

impl Account {
    /// Opens an account with the given starting wallet.
    #[must_use]
    pub fn new(id: AccountId, starting_spit: f64, starting_gold: f64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            wallet: Wallet {
                spit: starting_spit.max(0.0),
                gold: starting_gold.max(0.0),
            },
            deposits: Vec::new(),
            tickets: Vec::new(),
            chests: 0,
            inventory: BTreeMap::new(),
            stock_shares: 0,
            xp: 0,
            last_paycheck_at: None,
            created_at: now,
            last_modified_at: now,
        }
    }

    /// Current level derived from XP.
    #[must_use]
    pub fn level(&self) -> u32 {
        level_for_xp(self.xp)
    }

    /// Bank balance of one currency at `now`.
    #[must_use]
    pub fn bank_balance(&self, currency: Currency, now: DateTime<Utc>) -> BankBalance {
        sum_balances(self.deposits.iter().filter(|d| d.currency == currency), now)
    }

    /// Balance that can be withdrawn right now (matured deposits only).
    #[must_use]
    pub fn withdrawable(&self, currency: Currency, now: DateTime<Utc>) -> f64 {
        self.deposits
            .iter()
            .filter(|d| d.currency == currency && d.is_withdrawable_at(now))
            .map(|d| d.remaining_at(now))
            .sum()
    }

    /// Adds to the wallet.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidRequest`] for non-positive amounts.
    pub fn credit(&mut self, currency: Currency, amount: f64) -> Result<(), ServiceError> {
        let amount = positive(amount)?;
        *self.wallet.slot(currency) += amount;
        Ok(())
    }

    /// Takes from the wallet if the balance covers it.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InsufficientFunds`] when the wallet is short,
    /// or [`ServiceError::InvalidRequest`] for non-positive amounts.
    pub fn debit(&mut self, currency: Currency, amount: f64) -> Result<(), ServiceError> {
        let amount = positive(amount)?;
        let available = self.wallet.get(currency);
        if available + EPSILON < amount {
            return Err(ServiceError::InsufficientFunds {
                currency,
                needed: amount,
                available,
            });
        }
        *self.wallet.slot(currency) = (available - amount).max(0.0);
        Ok(())
    }

    fn award(&mut self, action: XpAction) {
        self.xp = self.xp.saturating_add(action.xp());
    }

    /// Moves `amount` from the wallet into a new demand deposit at the
    /// current market rate.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InsufficientFunds`] or
    /// [`ServiceError::InvalidRequest`].
    pub fn deposit(
        &mut self,
        currency: Currency,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<Deposit, ServiceError> {
        self.debit(currency, amount)?;
        let deposit = Deposit::new(currency, amount, current_daily_rate(now), now);
        Ok(self.push_deposit(deposit, XpAction::Deposit, now))
    }

    /// Moves `amount` from the wallet into a certificate of deposit.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InsufficientFunds`] or
    /// [`ServiceError::InvalidRequest`].
    pub fn open_certificate(
        &mut self,
        currency: Currency,
        amount: f64,
        term: CdTerm,
        now: DateTime<Utc>,
    ) -> Result<Deposit, ServiceError> {
        self.debit(currency, amount)?;
        let deposit = Deposit::certificate(currency, amount, current_daily_rate(now), term, now);
        Ok(self.push_deposit(deposit, XpAction::Deposit, now))
    }

    fn push_deposit(&mut self, deposit: Deposit, action: XpAction, now: DateTime<Utc>) -> Deposit {
        self.deposits.push(deposit.clone());
        self.award(action);
        self.last_modified_at = now;
        deposit
    }

    /// Withdraws `amount` from matured deposits, oldest first, into the
    /// wallet. Deposits drained to zero are closed. Returns the amount paid.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InsufficientBankBalance`] when the withdrawable
    /// balance is short, or [`ServiceError::InvalidRequest`].
    pub fn withdraw(
        &mut self,
        currency: Currency,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<f64, ServiceError> {
        let amount = positive(amount)?;
        let available = self.withdrawable(currency, now);
        if available + EPSILON < amount {
            return Err(ServiceError::InsufficientBankBalance {
                currency,
                needed: amount,
                available,
            });
        }

        let mut left = amount.min(available);
        for deposit in self
            .deposits
            .iter_mut()
            .filter(|d| d.currency == currency && d.is_withdrawable_at(now))
        {
            if left <= 0.0 {
                break;
            }
            let take = deposit.remaining_at(now).min(left);
            deposit.withdrawn += take;
            left -= take;
        }
        self.deposits
            .retain(|d| d.currency != currency || d.remaining_at(now) > EPSILON);

        let paid = amount.min(available);
        *self.wallet.slot(currency) += paid;
        self.last_modified_at = now;
        Ok(paid)
    }

    /// Removes every deposit whose remaining balance is positive but below
    /// `threshold`. Per currency, the dust is redeposited as one fresh
    /// deposit when the total reaches the threshold, otherwise credited to
    /// the wallet.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NothingToPurge`] when no deposit is dust.
    pub fn purge_dust(
        &mut self,
        threshold: f64,
        now: DateTime<Utc>,
    ) -> Result<DustPurge, ServiceError> {
        let mut dust: BTreeMap<&'static str, (Currency, f64)> = BTreeMap::new();
        let mut removed = 0;
        self.deposits.retain(|d| {
            if d.is_withdrawable_at(now) && d.is_dust_at(now, threshold) {
                let entry = dust.entry(d.currency.as_str()).or_insert((d.currency, 0.0));
                entry.1 += d.remaining_at(now);
                removed += 1;
                false
            } else {
                true
            }
        });
        if removed == 0 {
            return Err(ServiceError::NothingToPurge);
        }

        let rate = current_daily_rate(now);
        let mut consolidated = Vec::new();
        let mut credited_to_wallet = Vec::new();
        for (currency, total) in dust.into_values() {
            if total >= threshold {
                let deposit = Deposit::new(currency, total, rate, now);
                self.deposits.push(deposit.clone());
                consolidated.push(deposit);
            } else {
                *self.wallet.slot(currency) += total;
                credited_to_wallet.push((currency, total));
            }
        }
        self.last_modified_at = now;

        Ok(DustPurge {
            removed,
            consolidated,
            credited_to_wallet,
        })
    }

    /// Deposits a paycheck straight into the bank, at most once per
    /// `interval`. The wallet is never touched.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PaycheckNotReady`] inside the interval.
    pub fn claim_paycheck(
        &mut self,
        amount: f64,
        interval: Duration,
        now: DateTime<Utc>,
    ) -> Result<Deposit, ServiceError> {
        let amount = positive(amount)?;
        if let Some(last) = self.last_paycheck_at {
            // An interval reaching past the calendar range never elapses.
            let wait = match last.checked_add_signed(interval) {
                Some(next) if now >= next => None,
                Some(next) => Some(next - now),
                None => Some(interval),
            };
            if let Some(wait) = wait {
                return Err(ServiceError::PaycheckNotReady {
                    retry_after_secs: wait.num_seconds().max(1),
                });
            }
        }
        self.last_paycheck_at = Some(now);
        let deposit = Deposit::new(Currency::Spit, amount, current_daily_rate(now), now);
        Ok(self.push_deposit(deposit, XpAction::Paycheck, now))
    }

    /// Charges for a ticket and rolls its outcome once, storing both.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InsufficientFunds`] when the wallet cannot
    /// cover the ticket; nothing is rolled in that case.
    pub fn purchase_ticket<R: Rng + ?Sized>(
        &mut self,
        kind: TicketKind,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<LotteryTicket, ServiceError> {
        let tier = kind.definition();
        self.debit(tier.currency, tier.cost)?;
        let outcome = roll_outcome(&tier, rng);
        let ticket = LotteryTicket::new(kind, &tier, outcome, now);
        self.tickets.push(ticket.clone());
        self.award(XpAction::TicketPurchase);
        self.last_modified_at = now;
        Ok(ticket)
    }

    /// Reveals a ticket. The prize is credited on the first scratch only;
    /// the returned flag tells whether this call was that first scratch.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::TicketNotFound`] for unknown ticket IDs.
    pub fn scratch_ticket(
        &mut self,
        ticket_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(LotteryTicket, bool), ServiceError> {
        let ticket = self
            .tickets
            .iter_mut()
            .find(|t| t.id == ticket_id)
            .ok_or(ServiceError::TicketNotFound(ticket_id))?;
        let first = ticket.scratch(now);
        let revealed = ticket.clone();

        if first {
            if revealed.is_winner && revealed.prize_amount > 0.0 {
                *self.wallet.slot(revealed.currency) += revealed.prize_amount;
                self.award(XpAction::TicketWin);
            }
            self.last_modified_at = now;
        }
        Ok((revealed, first))
    }

    /// Buys `count` chests at `unit_cost` gold each.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InsufficientFunds`] or
    /// [`ServiceError::InvalidRequest`] for a zero count.
    pub fn buy_chests(
        &mut self,
        count: u32,
        unit_cost: f64,
        now: DateTime<Utc>,
    ) -> Result<f64, ServiceError> {
        if count == 0 {
            return Err(ServiceError::InvalidRequest(
                "chest count must be positive".to_string(),
            ));
        }
        let total = unit_cost * f64::from(count);
        self.debit(Currency::Gold, total)?;
        self.chests = self.chests.saturating_add(count);
        self.last_modified_at = now;
        Ok(total)
    }

    /// Opens one chest and applies its loot: credits to spit, gold to gold,
    /// items to the inventory.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NoChests`] when no chest is owned.
    pub fn open_chest<R: Rng + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Vec<ChestLootReward>, ServiceError> {
        if self.chests == 0 {
            return Err(ServiceError::NoChests);
        }
        let loot = roll_loot(rng);
        for reward in &loot {
            match reward.kind {
                LootKind::Credits => self.wallet.spit += f64::from(reward.amount),
                LootKind::Gold => self.wallet.gold += f64::from(reward.amount),
                LootKind::Item(item) => {
                    let count = self.inventory.entry(item).or_insert(0);
                    *count = count.saturating_add(reward.amount);
                }
            }
        }
        self.chests -= 1;
        self.award(XpAction::ChestOpen);
        self.last_modified_at = now;
        Ok(loot)
    }

    /// Buys `shares` at the current stock price.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InsufficientFunds`] or
    /// [`ServiceError::InvalidRequest`] for zero shares.
    pub fn buy_stock(&mut self, shares: u64, now: DateTime<Utc>) -> Result<StockTrade, ServiceError> {
        let trade = quote(TradeSide::Buy, shares, now)?;
        self.debit(Currency::Spit, trade.total)?;
        self.stock_shares = self.stock_shares.saturating_add(shares);
        self.award(XpAction::StockTrade);
        self.last_modified_at = now;
        Ok(trade)
    }

    /// Sells `shares` at the current stock price.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InsufficientShares`] or
    /// [`ServiceError::InvalidRequest`] for zero shares.
    pub fn sell_stock(
        &mut self,
        shares: u64,
        now: DateTime<Utc>,
    ) -> Result<StockTrade, ServiceError> {
        let trade = quote(TradeSide::Sell, shares, now)?;
        if self.stock_shares < shares {
            return Err(ServiceError::InsufficientShares {
                needed: shares,
                available: self.stock_shares,
            });
        }
        self.stock_shares -= shares;
        self.wallet.spit += trade.total;
        self.award(XpAction::StockTrade);
        self.last_modified_at = now;
        Ok(trade)
    }
}

#[allow(clippy::cast_precision_loss)]
fn quote(side: TradeSide, shares: u64, now: DateTime<Utc>) -> Result<StockTrade, ServiceError> {
    if shares == 0 {
        return Err(ServiceError::InvalidRequest(
            "share count must be positive".to_string(),
        ));
    }
    let price = stock_price(now);
    Ok(StockTrade {
        side,
        shares,
        price,
        total: price * shares as f64,
    })
}

fn positive(amount: f64) -> Result<f64, ServiceError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(ServiceError::InvalidRequest(format!(
            "amount must be a positive number, got {amount}"
        )))
    }
}
