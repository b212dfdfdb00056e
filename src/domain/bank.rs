//! Bank deposits, interest accrual and aggregate balances.
//!
//! Interest is simple accrual at the rate locked when the deposit was opened:
//!
//! ```text
//! interest = principal · locked_rate · elapsed_days
//! ```
//!
//! The rate never tracks the market oscillator after the deposit is created.
//! Every calculation here clamps bad numeric input to zero instead of failing.

use std::ops::Add;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Currency;
use super::market::MS_PER_DAY;

/// Term of a certificate of deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CdTerm {
    /// Matures after one day.
    OneDay,
    /// Matures after three days.
    ThreeDays,
    /// Matures after seven days.
    SevenDays,
}

impl CdTerm {
    /// Length of the term in whole days.
    #[must_use]
    pub const fn days(self) -> i64 {
        match self {
            Self::OneDay => 1,
            Self::ThreeDays => 3,
            Self::SevenDays => 7,
        }
    }

    /// Bonus applied to the market rate when the certificate is opened.
    #[must_use]
    pub const fn rate_multiplier(self) -> f64 {
        match self {
            Self::OneDay => 1.1,
            Self::ThreeDays => 1.25,
            Self::SevenDays => 1.5,
        }
    }
}

/// A single bank deposit.
///
/// `principal` and `locked_rate` are fixed at creation; only `withdrawn`
/// grows afterwards, and never past `principal + interest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Deposit {
    /// Deposit identifier.
    pub id: Uuid,
    /// Currency the deposit is denominated in.
    pub currency: Currency,
    /// Amount originally deposited.
    pub principal: f64,
    /// Daily rate locked at deposit time.
    pub locked_rate: f64,
    /// When the deposit was opened.
    pub deposited_at: DateTime<Utc>,
    /// Amount already withdrawn (principal and interest combined).
    pub withdrawn: f64,
    /// Maturity of a certificate of deposit; `None` for a demand deposit.
    #[serde(default)]
    pub matures_at: Option<DateTime<Utc>>,
}

impl Deposit {
    /// Opens a demand deposit that can be withdrawn at any time.
    #[must_use]
    pub fn new(
        currency: Currency,
        principal: f64,
        locked_rate: f64,
        deposited_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            currency,
            principal: non_negative(principal),
            locked_rate: non_negative(locked_rate),
            deposited_at,
            withdrawn: 0.0,
            matures_at: None,
        }
    }

    /// Opens a certificate of deposit. The market rate is boosted by the
    /// term's multiplier and interest stops accruing at maturity.
    #[must_use]
    pub fn certificate(
        currency: Currency,
        principal: f64,
        market_rate: f64,
        term: CdTerm,
        deposited_at: DateTime<Utc>,
    ) -> Self {
        let mut deposit = Self::new(
            currency,
            principal,
            market_rate * term.rate_multiplier(),
            deposited_at,
        );
        deposit.matures_at = Some(deposited_at + Duration::days(term.days()));
        deposit
    }

    /// `true` for certificates of deposit.
    #[must_use]
    pub const fn is_certificate(&self) -> bool {
        self.matures_at.is_some()
    }

    /// Whether the deposit may be drawn from at `now`.
    #[must_use]
    pub fn is_withdrawable_at(&self, now: DateTime<Utc>) -> bool {
        self.matures_at.is_none_or(|maturity| now >= maturity)
    }

    /// Interest accrued up to `now` (capped at maturity for certificates).
    #[must_use]
    pub fn interest_at(&self, now: DateTime<Utc>) -> f64 {
        let until = match self.matures_at {
            Some(maturity) if maturity < now => maturity,
            _ => now,
        };
        calculate_interest(self.principal, self.locked_rate, self.deposited_at, until)
    }

    /// Balance left in the deposit at `now`, never negative.
    #[must_use]
    pub fn remaining_at(&self, now: DateTime<Utc>) -> f64 {
        (non_negative(self.principal) + self.interest_at(now) - non_negative(self.withdrawn))
            .max(0.0)
    }

    /// A deposit is dust when something is left but less than `threshold`.
    #[must_use]
    pub fn is_dust_at(&self, now: DateTime<Utc>, threshold: f64) -> bool {
        let remaining = self.remaining_at(now);
        remaining > 0.0 && remaining < threshold
    }
}

/// Aggregate view over a set of deposits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BankBalance {
    /// Sum of principals.
    pub total_principal: f64,
    /// Sum of accrued interest.
    pub total_interest: f64,
    /// Sum of per-deposit remaining balances.
    pub total_balance: f64,
}

impl Add for BankBalance {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            total_principal: self.total_principal + rhs.total_principal,
            total_interest: self.total_interest + rhs.total_interest,
            total_balance: self.total_balance + rhs.total_balance,
        }
    }
}

/// Interest earned by `principal` at `locked_rate` per day between
/// `deposited_at` and `now`.
///
/// Zero when no time has elapsed; a `now` earlier than `deposited_at` (clock
/// skew) counts as zero elapsed time. Negative or non-finite principal and
/// rate are treated as zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn calculate_interest(
    principal: f64,
    locked_rate: f64,
    deposited_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> f64 {
    calculate_interest_millis(
        principal,
        locked_rate,
        deposited_at.timestamp_millis() as f64,
        now.timestamp_millis() as f64,
    )
}

/// Millisecond-timestamp form of [`calculate_interest`]. Non-finite
/// timestamps yield zero interest.
#[must_use]
pub fn calculate_interest_millis(
    principal: f64,
    locked_rate: f64,
    deposited_at_ms: f64,
    now_ms: f64,
) -> f64 {
    let elapsed_ms = now_ms - deposited_at_ms;
    if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
        return 0.0;
    }
    let elapsed_days = elapsed_ms / MS_PER_DAY;
    non_negative(principal) * non_negative(locked_rate) * elapsed_days
}

/// Sums principal, interest and remaining balance over `deposits` at `now`.
///
/// Each deposit contributes independently, so the result is additive over
/// any partition of the input.
#[must_use]
pub fn calculate_bank_balance(deposits: &[Deposit], now: DateTime<Utc>) -> BankBalance {
    sum_balances(deposits, now)
}

/// Iterator form of [`calculate_bank_balance`], for filtered views such as a
/// single currency.
pub fn sum_balances<'a, I>(deposits: I, now: DateTime<Utc>) -> BankBalance
where
    I: IntoIterator<Item = &'a Deposit>,
{
    deposits
        .into_iter()
        .map(|d| BankBalance {
            total_principal: non_negative(d.principal),
            total_interest: d.interest_at(now),
            total_balance: d.remaining_at(now),
        })
        .fold(BankBalance::default(), Add::add)
}

fn non_negative(x: f64) -> f64 {
    if x.is_finite() && x > 0.0 { x } else { 0.0 }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        let Ok(t) = DateTime::parse_from_rfc3339(s) else {
            panic!("bad timestamp {s}");
        };
        t.with_timezone(&Utc)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn one_day_at_one_percent() {
        let interest = calculate_interest(
            1000.0,
            0.01,
            ts("2024-01-01T00:00:00Z"),
            ts("2024-01-02T00:00:00Z"),
        );
        assert!(approx(interest, 10.0), "got {interest}");
    }

    #[test]
    fn zero_elapsed_is_zero_interest() {
        let t = ts("2024-03-10T12:34:56Z");
        assert_eq!(calculate_interest(12_345.0, 0.02, t, t), 0.0);
    }

    #[test]
    fn clock_skew_clamps_to_zero() {
        let later = ts("2024-03-10T12:00:00Z");
        let earlier = ts("2024-03-09T12:00:00Z");
        assert_eq!(calculate_interest(100.0, 0.01, later, earlier), 0.0);
    }

    #[test]
    fn bad_numbers_clamp_to_zero() {
        let a = ts("2024-01-01T00:00:00Z");
        let b = ts("2024-01-05T00:00:00Z");
        assert_eq!(calculate_interest(-50.0, 0.01, a, b), 0.0);
        assert_eq!(calculate_interest(f64::NAN, 0.01, a, b), 0.0);
        assert_eq!(calculate_interest(100.0, f64::INFINITY, a, b), 0.0);
        assert_eq!(calculate_interest_millis(100.0, 0.01, 0.0, f64::NAN), 0.0);
    }

    #[test]
    fn interest_is_monotone_in_now() {
        let start = ts("2024-01-01T00:00:00Z");
        let mut last = 0.0;
        for minutes in (0..10_000).step_by(37) {
            let now = start + Duration::minutes(minutes);
            let interest = calculate_interest(777.0, 0.013, start, now);
            assert!(interest >= last);
            last = interest;
        }
    }

    #[test]
    fn empty_bank_is_zero() {
        let balance = calculate_bank_balance(&[], Utc::now());
        assert_eq!(balance.total_balance, 0.0);
        assert_eq!(balance, BankBalance::default());
    }

    #[test]
    fn three_days_at_half_percent() {
        let now = ts("2024-06-04T00:00:00Z");
        let deposit = Deposit::new(Currency::Spit, 500.0, 0.005, now - Duration::days(3));
        let balance = calculate_bank_balance(&[deposit], now);
        assert!(approx(balance.total_principal, 500.0));
        assert!(approx(balance.total_interest, 7.5));
        assert!(approx(balance.total_balance, 507.5));
    }

    #[test]
    fn balance_is_additive() {
        let now = ts("2024-06-10T08:00:00Z");
        let mut d1 = Deposit::new(Currency::Spit, 300.0, 0.011, now - Duration::hours(50));
        d1.withdrawn = 120.0;
        let d2 = Deposit::new(Currency::Spit, 42.5, 0.002, now - Duration::minutes(90));

        let both = calculate_bank_balance(&[d1.clone(), d2.clone()], now);
        let split = calculate_bank_balance(&[d1], now) + calculate_bank_balance(&[d2], now);
        assert!(approx(both.total_principal, split.total_principal));
        assert!(approx(both.total_interest, split.total_interest));
        assert!(approx(both.total_balance, split.total_balance));
    }

    #[test]
    fn remaining_never_negative() {
        let now = ts("2024-06-10T08:00:00Z");
        let mut d = Deposit::new(Currency::Gold, 10.0, 0.01, now);
        d.withdrawn = 50.0;
        assert_eq!(d.remaining_at(now), 0.0);
        assert!(!d.is_dust_at(now, 1.0));
    }

    #[test]
    fn dust_is_small_positive_remainder() {
        let now = ts("2024-06-10T08:00:00Z");
        let mut d = Deposit::new(Currency::Spit, 100.0, 0.0, now);
        d.withdrawn = 99.5;
        assert!(d.is_dust_at(now, 1.0));
        assert!(!d.is_dust_at(now, 0.5));
    }

    #[test]
    fn certificate_stops_accruing_at_maturity() {
        let opened = ts("2024-01-01T00:00:00Z");
        let cd = Deposit::certificate(Currency::Spit, 1000.0, 0.01, CdTerm::OneDay, opened);
        assert!(approx(cd.locked_rate, 0.011));
        assert!(!cd.is_withdrawable_at(opened + Duration::hours(23)));
        assert!(cd.is_withdrawable_at(opened + Duration::days(1)));

        let at_maturity = cd.interest_at(opened + Duration::days(1));
        let long_after = cd.interest_at(opened + Duration::days(30));
        assert!(approx(at_maturity, 11.0));
        assert!(approx(at_maturity, long_after));
    }
}
