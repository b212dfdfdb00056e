//! Experience points awarded for economy actions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// XP needed per level step; level `n` starts at `XP_PER_LEVEL · (n − 1)²`.
pub const XP_PER_LEVEL: u64 = 100;

/// Actions that earn XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum XpAction {
    /// Opened a deposit or certificate.
    Deposit,
    /// Bought a lottery ticket.
    TicketPurchase,
    /// Scratched a winning ticket.
    TicketWin,
    /// Opened a chest.
    ChestOpen,
    /// Bought or sold stock.
    StockTrade,
    /// Collected a paycheck.
    Paycheck,
}

impl XpAction {
    /// XP granted for one occurrence.
    #[must_use]
    pub const fn xp(self) -> u64 {
        match self {
            Self::Deposit => 5,
            Self::TicketPurchase => 2,
            Self::TicketWin => 10,
            Self::ChestOpen => 15,
            Self::StockTrade => 3,
            Self::Paycheck => 5,
        }
    }
}

/// Level reached with `xp` total experience: `floor(sqrt(xp / 100)) + 1`.
#[must_use]
pub fn level_for_xp(xp: u64) -> u32 {
    let steps = (xp / XP_PER_LEVEL).isqrt();
    u32::try_from(steps).unwrap_or(u32::MAX - 1) + 1
}
