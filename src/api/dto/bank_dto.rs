//! Bank DTOs: deposits, withdrawals, dust purge and paychecks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Account, AccountId, CdTerm, Currency, Deposit, DustPurge, Wallet};

/// Request body for `POST /accounts/{id}/bank/deposit`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DepositRequest {
    /// Currency to deposit.
    pub currency: Currency,
    /// Amount taken from the wallet.
    pub amount: f64,
    /// Certificate term; a plain demand deposit when omitted.
    #[serde(default)]
    pub term: Option<CdTerm>,
}

/// Response body for a new deposit or paycheck.
#[derive(Debug, Serialize, ToSchema)]
pub struct DepositResponse {
    /// The deposit created.
    pub deposit: Deposit,
    /// Wallet after the operation.
    pub wallet: Wallet,
}

/// Response body for `POST /accounts/{id}/bank/paycheck`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaycheckResponse {
    /// The deposit created.
    pub deposit: Deposit,
    /// Earliest time of the next paycheck.
    pub next_paycheck_at: DateTime<Utc>,
}

/// Request body for `POST /accounts/{id}/bank/withdraw`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct WithdrawRequest {
    /// Currency to withdraw.
    pub currency: Currency,
    /// Amount moved to the wallet.
    pub amount: f64,
}

/// Response body for `POST /accounts/{id}/bank/withdraw`.
#[derive(Debug, Serialize, ToSchema)]
pub struct WithdrawResponse {
    /// Currency withdrawn.
    pub currency: Currency,
    /// Amount paid out.
    pub amount: f64,
    /// Wallet after the withdrawal.
    pub wallet: Wallet,
}

/// Dust credited straight to the wallet.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreditedDust {
    /// Currency credited.
    pub currency: Currency,
    /// Amount credited.
    pub amount: f64,
}

/// Response body for `POST /accounts/{id}/bank/purge-dust`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PurgeDustResponse {
    /// Number of dust deposits removed.
    pub removed: usize,
    /// Fresh deposits holding the consolidated dust.
    pub consolidated: Vec<Deposit>,
    /// Dust too small to redeposit.
    pub credited_to_wallet: Vec<CreditedDust>,
}

impl From<DustPurge> for PurgeDustResponse {
    fn from(purge: DustPurge) -> Self {
        Self {
            removed: purge.removed,
            consolidated: purge.consolidated,
            credited_to_wallet: purge
                .credited_to_wallet
                .into_iter()
                .map(|(currency, amount)| CreditedDust { currency, amount })
                .collect(),
        }
    }
}

/// Aggregate bank balance of one currency.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrencyBalanceDto {
    /// Currency.
    pub currency: Currency,
    /// Sum of principals.
    pub total_principal: f64,
    /// Interest accrued so far.
    pub total_interest: f64,
    /// Principal plus interest minus withdrawals.
    pub total_balance: f64,
    /// Part of the balance not locked in immature certificates.
    pub withdrawable: f64,
}

/// A deposit with its accrued values at the time of the request.
#[derive(Debug, Serialize, ToSchema)]
pub struct DepositView {
    /// Deposit identifier.
    pub deposit_id: Uuid,
    /// Deposited currency.
    pub currency: Currency,
    /// Amount originally deposited.
    pub principal: f64,
    /// Daily rate locked at deposit time.
    pub locked_rate: f64,
    /// Deposit timestamp.
    pub deposited_at: DateTime<Utc>,
    /// Amount already withdrawn.
    pub withdrawn: f64,
    /// Interest accrued so far.
    pub interest: f64,
    /// Balance still in the deposit.
    pub remaining: f64,
    /// Certificate maturity, if this is a certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matures_at: Option<DateTime<Utc>>,
    /// Whether the deposit can be withdrawn now.
    pub withdrawable: bool,
}

impl DepositView {
    /// Evaluates `deposit` at `now`.
    #[must_use]
    pub fn at(deposit: &Deposit, now: DateTime<Utc>) -> Self {
        Self {
            deposit_id: deposit.id,
            currency: deposit.currency,
            principal: deposit.principal,
            locked_rate: deposit.locked_rate,
            deposited_at: deposit.deposited_at,
            withdrawn: deposit.withdrawn,
            interest: deposit.interest_at(now),
            remaining: deposit.remaining_at(now),
            matures_at: deposit.matures_at,
            withdrawable: deposit.is_withdrawable_at(now),
        }
    }
}

/// Response body for `GET /accounts/{id}/bank`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BankResponse {
    /// Account identifier.
    pub account_id: AccountId,
    /// Evaluation time.
    pub as_of: DateTime<Utc>,
    /// Market daily rate a new deposit would lock in.
    pub current_daily_rate: f64,
    /// Per-currency totals.
    pub balances: Vec<CurrencyBalanceDto>,
    /// Every open deposit, oldest first.
    pub deposits: Vec<DepositView>,
}

impl BankResponse {
    /// Evaluates the bank of `account` at `now`.
    #[must_use]
    pub fn at(account: &Account, now: DateTime<Utc>) -> Self {
        let balances = Currency::ALL
            .into_iter()
            .map(|currency| {
                let balance = account.bank_balance(currency, now);
                CurrencyBalanceDto {
                    currency,
                    total_principal: balance.total_principal,
                    total_interest: balance.total_interest,
                    total_balance: balance.total_balance,
                    withdrawable: account.withdrawable(currency, now),
                }
            })
            .collect();
        Self {
            account_id: account.id,
            as_of: now,
            current_daily_rate: crate::domain::market::current_daily_rate(now),
            balances,
            deposits: account
                .deposits
                .iter()
                .map(|d| DepositView::at(d, now))
                .collect(),
        }
    }
}
