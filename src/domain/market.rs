//! Time-keyed oscillators driving the bank interest rate and the stock price.
//!
//! Both signals are pure functions of wall-clock time: nothing is stored, and
//! any timestamp reproduces the same value. Each signal is a sine wave mapped
//! onto `[min, max]`:
//!
//! ```text
//! value(t) = min + (sin(2π · t / period + phase) + 1) / 2 · (max − min)
//! ```
//!
//! with `t` in milliseconds since the Unix epoch. The stock oscillator uses its
//! own period and phase so the two signals never move in lockstep.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, TAU};

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Milliseconds in one hour.
pub const MS_PER_HOUR: f64 = 3_600_000.0;

/// Milliseconds in one day.
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Lowest daily interest rate the bank ever offers.
pub const MIN_DAILY_RATE: f64 = 0.001;

/// Highest daily interest rate the bank ever offers.
pub const MAX_DAILY_RATE: f64 = 0.02;

/// One full interest-rate cycle.
pub const RATE_PERIOD_MS: f64 = 3.0 * MS_PER_DAY;

/// Lowest stock price, in spit per share.
pub const MIN_STOCK_PRICE: f64 = 50.0;

/// Highest stock price, in spit per share.
pub const MAX_STOCK_PRICE: f64 = 150.0;

/// One full stock-price cycle.
pub const STOCK_PERIOD_MS: f64 = 5.0 * MS_PER_DAY;

/// Oscillator behind [`current_daily_rate`].
pub const RATE_OSCILLATOR: Oscillator =
    Oscillator::new(MIN_DAILY_RATE, MAX_DAILY_RATE, RATE_PERIOD_MS, 0.0);

/// Oscillator behind [`stock_price`].
pub const STOCK_OSCILLATOR: Oscillator =
    Oscillator::new(MIN_STOCK_PRICE, MAX_STOCK_PRICE, STOCK_PERIOD_MS, FRAC_PI_3);

/// A bounded sinusoid keyed on wall-clock milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oscillator {
    min: f64,
    max: f64,
    period_ms: f64,
    phase: f64,
}

impl Oscillator {
    /// Creates an oscillator spanning `[min, max]` with the given period and
    /// phase offset (radians).
    #[must_use]
    pub const fn new(min: f64, max: f64, period_ms: f64, phase: f64) -> Self {
        Self {
            min,
            max,
            period_ms,
            phase,
        }
    }

    /// Lower bound of the signal.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound of the signal.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Length of one cycle in milliseconds.
    #[must_use]
    pub const fn period_ms(&self) -> f64 {
        self.period_ms
    }

    /// Phase angle at `t_ms`. Non-finite inputs are read as the epoch.
    fn angle(&self, t_ms: f64) -> f64 {
        let t = if t_ms.is_finite() { t_ms } else { 0.0 };
        TAU * t / self.period_ms + self.phase
    }

    /// Signal value at `t_ms` milliseconds since the epoch.
    #[must_use]
    pub fn value_at_millis(&self, t_ms: f64) -> f64 {
        let unit = (self.angle(t_ms).sin() + 1.0) / 2.0;
        (self.min + unit * (self.max - self.min)).clamp(self.min, self.max)
    }

    /// Signal value at `now`.
    #[must_use]
    pub fn value_at(&self, now: DateTime<Utc>) -> f64 {
        self.value_at_millis(millis(now))
    }

    /// `true` while the signal is increasing (positive derivative).
    #[must_use]
    pub fn is_rising_at(&self, now: DateTime<Utc>) -> bool {
        self.angle(millis(now)).cos() > 0.0
    }

    /// Hours until the signal next reaches its maximum.
    #[must_use]
    pub fn hours_to_peak(&self, now: DateTime<Utc>) -> f64 {
        self.hours_until_angle(millis(now), FRAC_PI_2)
    }

    /// Hours until the signal next reaches its minimum.
    #[must_use]
    pub fn hours_to_trough(&self, now: DateTime<Utc>) -> f64 {
        self.hours_until_angle(millis(now), 3.0 * FRAC_PI_2)
    }

    fn hours_until_angle(&self, t_ms: f64, target: f64) -> f64 {
        let remaining = (target - self.angle(t_ms)).rem_euclid(TAU);
        remaining / TAU * self.period_ms / MS_PER_HOUR
    }
}

#[allow(clippy::cast_precision_loss)]
fn millis(now: DateTime<Utc>) -> f64 {
    now.timestamp_millis() as f64
}

/// Daily interest rate offered to new deposits at `now`.
///
/// Always within `[MIN_DAILY_RATE, MAX_DAILY_RATE]`.
#[must_use]
pub fn current_daily_rate(now: DateTime<Utc>) -> f64 {
    RATE_OSCILLATOR.value_at(now)
}

/// Stock price in spit per share at `now`. Always positive.
#[must_use]
pub fn stock_price(now: DateTime<Utc>) -> f64 {
    STOCK_OSCILLATOR.value_at(now)
}

/// Point-in-time view of both market signals.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MarketSnapshot {
    /// Daily rate a deposit opened now would lock in.
    pub daily_rate: f64,
    /// Whether the rate is currently climbing.
    pub rate_rising: bool,
    /// Hours until the rate peaks.
    pub hours_to_rate_peak: f64,
    /// Hours until the rate bottoms out.
    pub hours_to_rate_trough: f64,
    /// Current stock price.
    pub stock_price: f64,
    /// Whether the stock price is currently climbing.
    pub stock_rising: bool,
    /// Hours until the stock price peaks.
    pub hours_to_stock_peak: f64,
    /// Hours until the stock price bottoms out.
    pub hours_to_stock_trough: f64,
    /// Timestamp the snapshot was evaluated at.
    pub as_of: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Evaluates both oscillators at `now`.
    #[must_use]
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            daily_rate: RATE_OSCILLATOR.value_at(now),
            rate_rising: RATE_OSCILLATOR.is_rising_at(now),
            hours_to_rate_peak: RATE_OSCILLATOR.hours_to_peak(now),
            hours_to_rate_trough: RATE_OSCILLATOR.hours_to_trough(now),
            stock_price: STOCK_OSCILLATOR.value_at(now),
            stock_rising: STOCK_OSCILLATOR.is_rising_at(now),
            hours_to_stock_peak: STOCK_OSCILLATOR.hours_to_peak(now),
            hours_to_stock_trough: STOCK_OSCILLATOR.hours_to_trough(now),
            as_of: now,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(ms: i64) -> DateTime<Utc> {
        let Some(t) = Utc.timestamp_millis_opt(ms).single() else {
            panic!("valid timestamp");
        };
        t
    }

    #[test]
    fn rate_stays_within_bounds() {
        let step = 7 * 60 * 1000 + 13;
        for i in 0..5_000_i64 {
            let rate = current_daily_rate(at(1_700_000_000_000 + i * step));
            assert!((MIN_DAILY_RATE..=MAX_DAILY_RATE).contains(&rate), "rate {rate}");
        }
    }

    #[test]
    fn rate_is_periodic() {
        let t = 1_704_067_200_000.0;
        let a = RATE_OSCILLATOR.value_at_millis(t);
        let b = RATE_OSCILLATOR.value_at_millis(t + RATE_PERIOD_MS);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn rate_is_continuous() {
        // Max slope is π·(max−min)/period per ms.
        let bound = std::f64::consts::PI * (MAX_DAILY_RATE - MIN_DAILY_RATE) / RATE_PERIOD_MS;
        let t = 1_704_067_200_000.0;
        for i in 0..1_000_i32 {
            let t0 = t + f64::from(i) * 60_000.0;
            let delta = (RATE_OSCILLATOR.value_at_millis(t0 + 1.0)
                - RATE_OSCILLATOR.value_at_millis(t0))
            .abs();
            assert!(delta <= bound * 1.01 + 1e-12);
        }
    }

    #[test]
    fn epoch_sits_at_midpoint_and_rising() {
        let mid = (MIN_DAILY_RATE + MAX_DAILY_RATE) / 2.0;
        assert!((current_daily_rate(at(0)) - mid).abs() < 1e-12);
        assert!(RATE_OSCILLATOR.is_rising_at(at(0)));
    }

    #[test]
    fn quarter_period_is_peak() {
        let quarter = (RATE_PERIOD_MS / 4.0) as i64;
        let peak = current_daily_rate(at(quarter));
        assert!((peak - MAX_DAILY_RATE).abs() < 1e-12);
        assert!((RATE_OSCILLATOR.hours_to_peak(at(0)) - 18.0).abs() < 1e-9);
        assert!((RATE_OSCILLATOR.hours_to_trough(at(0)) - 54.0).abs() < 1e-9);
    }

    #[test]
    fn non_finite_time_reads_as_epoch() {
        let epoch = RATE_OSCILLATOR.value_at_millis(0.0);
        assert_eq!(RATE_OSCILLATOR.value_at_millis(f64::NAN), epoch);
        assert_eq!(RATE_OSCILLATOR.value_at_millis(f64::INFINITY), epoch);
    }

    #[test]
    fn stock_price_positive_and_bounded() {
        let start = at(1_700_000_000_000);
        for h in 0..500 {
            let price = stock_price(start + Duration::hours(h));
            assert!(price > 0.0);
            assert!((MIN_STOCK_PRICE..=MAX_STOCK_PRICE).contains(&price));
        }
    }

    #[test]
    fn stock_and_rate_are_not_in_lockstep() {
        let start = at(1_700_000_000_000);
        let disagreements = (0..240)
            .map(|h| start + Duration::hours(h))
            .filter(|t| RATE_OSCILLATOR.is_rising_at(*t) != STOCK_OSCILLATOR.is_rising_at(*t))
            .count();
        assert!(disagreements > 0);
    }

    #[test]
    fn hours_to_peak_within_one_period() {
        let start = at(1_712_345_678_901);
        let period_hours = STOCK_PERIOD_MS / MS_PER_HOUR;
        let h = STOCK_OSCILLATOR.hours_to_peak(start);
        assert!((0.0..period_hours).contains(&h));
    }

    #[test]
    fn snapshot_matches_free_functions() {
        let now = at(1_712_345_678_901);
        let snap = MarketSnapshot::at(now);
        assert_eq!(snap.daily_rate, current_daily_rate(now));
        assert_eq!(snap.stock_price, stock_price(now));
        assert_eq!(snap.as_of, now);
    }
}
