//! Platform currencies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ServiceError;

/// A currency held in a wallet or a bank deposit.
///
/// `Spit` is the everyday currency (also paid out as "credits" by chests);
/// `Gold` is the scarcer currency used for chests and premium tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    /// Basic platform currency.
    Spit,
    /// Secondary, scarcer currency.
    Gold,
}

impl Currency {
    /// Every currency, in display order.
    pub const ALL: [Self; 2] = [Self::Spit, Self::Gold];

    /// Returns the wire name of the currency.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spit => "spit",
            Self::Gold => "gold",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spit" => Ok(Self::Spit),
            "gold" => Ok(Self::Gold),
            other => Err(ServiceError::InvalidRequest(format!(
                "unknown currency: {other}"
            ))),
        }
    }
}
