//! Scratch-off lottery tickets.
//!
//! A ticket's outcome is rolled exactly once, when it is bought, and stored
//! with the ticket. Scratching only reveals the stored result.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Currency;
use crate::error::ServiceError;

/// The ticket tiers sold by the lottery booth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
    /// One-spit ticket with frequent small wins.
    Penny,
    /// Ten-spit ticket.
    Quick,
    /// Fifty-spit ticket with a large jackpot.
    Lucky,
    /// Gold-priced ticket paying out in gold.
    Golden,
}

impl TicketKind {
    /// Every tier, cheapest first.
    pub const ALL: [Self; 4] = [Self::Penny, Self::Quick, Self::Lucky, Self::Golden];

    /// Wire name of the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Penny => "penny",
            Self::Quick => "quick",
            Self::Lucky => "lucky",
            Self::Golden => "golden",
        }
    }

    /// Price, odds and prize table for this tier.
    #[must_use]
    pub fn definition(self) -> TierDefinition {
        let (cost, currency, win_chance, prizes): (f64, Currency, f64, &[(f64, f64)]) = match self
        {
            Self::Penny => (
                1.0,
                Currency::Spit,
                0.30,
                &[(0.70, 1.5), (0.25, 3.0), (0.05, 10.0)],
            ),
            Self::Quick => (
                10.0,
                Currency::Spit,
                0.25,
                &[(0.60, 15.0), (0.30, 30.0), (0.09, 100.0), (0.01, 500.0)],
            ),
            Self::Lucky => (
                50.0,
                Currency::Spit,
                0.20,
                &[(0.60, 75.0), (0.30, 150.0), (0.09, 500.0), (0.01, 2_500.0)],
            ),
            Self::Golden => (
                1.0,
                Currency::Gold,
                0.15,
                &[(0.70, 2.0), (0.25, 5.0), (0.05, 25.0)],
            ),
        };
        TierDefinition {
            cost,
            currency,
            win_chance,
            prize_table: prizes
                .iter()
                .map(|&(probability, amount)| PrizeTier {
                    probability,
                    amount,
                })
                .collect(),
        }
    }
}

impl fmt::Display for TicketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketKind {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ServiceError::InvalidTicketKind(s.to_string()))
    }
}

/// One row of a prize table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct PrizeTier {
    /// Probability of this prize given a win.
    pub probability: f64,
    /// Prize paid in the ticket's currency.
    pub amount: f64,
}

/// Price and odds of a ticket tier.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TierDefinition {
    /// Ticket price.
    pub cost: f64,
    /// Currency the ticket is bought and paid out in.
    pub currency: Currency,
    /// Probability that a ticket wins anything.
    pub win_chance: f64,
    /// Prize distribution for winning tickets.
    pub prize_table: Vec<PrizeTier>,
}

/// Result of a single lottery roll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TicketOutcome {
    /// Whether the ticket won.
    pub is_winner: bool,
    /// Prize amount; zero for losing tickets.
    pub prize_amount: f64,
}

impl TicketOutcome {
    const LOSS: Self = Self {
        is_winner: false,
        prize_amount: 0.0,
    };
}

/// Rolls a ticket outcome for `tier` using `rng`.
///
/// One uniform draw decides win or lose against `win_chance`. A winner takes a
/// second draw and walks the prize table by cumulative probability; if the
/// table sums to less than the draw, the last tier is paid. A winning roll
/// against an empty prize table counts as a loss.
pub fn roll_outcome<R: Rng + ?Sized>(tier: &TierDefinition, rng: &mut R) -> TicketOutcome {
    let draw: f64 = rng.random();
    if !(draw < tier.win_chance) {
        return TicketOutcome::LOSS;
    }
    let Some(last) = tier.prize_table.last() else {
        return TicketOutcome::LOSS;
    };

    let pick: f64 = rng.random();
    let mut cumulative = 0.0;
    let prize = tier
        .prize_table
        .iter()
        .find(|t| {
            cumulative += t.probability.max(0.0);
            pick <= cumulative
        })
        .unwrap_or(last);

    TicketOutcome {
        is_winner: true,
        prize_amount: prize.amount,
    }
}

/// Rolls a ticket outcome for a built-in tier with the thread-local RNG.
#[must_use]
pub fn roll_ticket_outcome(kind: TicketKind) -> TicketOutcome {
    roll_outcome(&kind.definition(), &mut rand::rng())
}

/// A purchased ticket. The outcome is fixed at purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LotteryTicket {
    /// Ticket identifier.
    pub id: Uuid,
    /// Tier the ticket was bought from.
    pub ticket_type: TicketKind,
    /// Price paid.
    pub cost: f64,
    /// Currency paid and won in.
    pub currency: Currency,
    /// Stored outcome.
    pub is_winner: bool,
    /// Stored prize.
    pub prize_amount: f64,
    /// Whether the ticket has been revealed.
    pub scratched: bool,
    /// Purchase timestamp.
    pub purchased_at: DateTime<Utc>,
    /// First reveal timestamp.
    #[serde(default)]
    pub scratched_at: Option<DateTime<Utc>>,
}

impl LotteryTicket {
    /// Builds an unscratched ticket carrying an already-rolled outcome.
    #[must_use]
    pub fn new(
        kind: TicketKind,
        tier: &TierDefinition,
        outcome: TicketOutcome,
        purchased_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticket_type: kind,
            cost: tier.cost,
            currency: tier.currency,
            is_winner: outcome.is_winner,
            prize_amount: outcome.prize_amount,
            scratched: false,
            purchased_at,
            scratched_at: None,
        }
    }

    /// Marks the ticket revealed. Returns `true` only on the first scratch,
    /// which is when any prize should be paid.
    pub fn scratch(&mut self, now: DateTime<Utc>) -> bool {
        if self.scratched {
            return false;
        }
        self.scratched = true;
        self.scratched_at = Some(now);
        true
    }

    /// The stored outcome.
    #[must_use]
    pub const fn outcome(&self) -> TicketOutcome {
        TicketOutcome {
            is_winner: self.is_winner,
            prize_amount: self.prize_amount,
        }
    }
}
