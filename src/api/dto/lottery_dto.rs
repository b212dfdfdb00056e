//! Lottery DTOs.
//!
//! A ticket's outcome is stored from the moment it is bought, but views only
//! expose it once the ticket has been scratched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::lottery::PrizeTier;
use crate::domain::{Currency, LotteryTicket, TicketKind, Wallet};

/// Request body for `POST /accounts/{id}/tickets`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchaseTicketRequest {
    /// Tier name: `penny`, `quick`, `lucky` or `golden`.
    pub ticket_type: String,
}

/// A ticket as shown to its owner.
#[derive(Debug, Serialize, ToSchema)]
pub struct TicketView {
    /// Ticket identifier.
    pub ticket_id: Uuid,
    /// Tier.
    pub ticket_type: TicketKind,
    /// Price paid.
    pub cost: f64,
    /// Currency paid and won in.
    pub currency: Currency,
    /// Whether the ticket has been revealed.
    pub scratched: bool,
    /// Outcome, once scratched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_winner: Option<bool>,
    /// Prize, once scratched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prize_amount: Option<f64>,
    /// Purchase timestamp.
    pub purchased_at: DateTime<Utc>,
    /// First reveal timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratched_at: Option<DateTime<Utc>>,
}

impl From<&LotteryTicket> for TicketView {
    fn from(ticket: &LotteryTicket) -> Self {
        let revealed = ticket.scratched;
        Self {
            ticket_id: ticket.id,
            ticket_type: ticket.ticket_type,
            cost: ticket.cost,
            currency: ticket.currency,
            scratched: revealed,
            is_winner: revealed.then_some(ticket.is_winner),
            prize_amount: revealed.then_some(ticket.prize_amount),
            purchased_at: ticket.purchased_at,
            scratched_at: ticket.scratched_at,
        }
    }
}

/// Response body for `POST /accounts/{id}/tickets`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseTicketResponse {
    /// The ticket, unrevealed.
    pub ticket: TicketView,
    /// `true` when this replays an earlier purchase with the same
    /// `Idempotency-Key`.
    pub replayed: bool,
}

/// Response body for `GET /accounts/{id}/tickets`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TicketListResponse {
    /// Tickets, oldest first.
    pub tickets: Vec<TicketView>,
}

/// Response body for `POST /accounts/{id}/tickets/{ticket_id}/scratch`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScratchResponse {
    /// The revealed ticket.
    pub ticket: TicketView,
    /// Wallet after any prize was credited.
    pub wallet: Wallet,
}

/// One entry of the ticket tier catalog.
#[derive(Debug, Serialize, ToSchema)]
pub struct TicketTierDto {
    /// Tier.
    pub ticket_type: TicketKind,
    /// Price.
    pub cost: f64,
    /// Currency paid and won in.
    pub currency: Currency,
    /// Probability that a ticket wins anything.
    pub win_chance: f64,
    /// Prize distribution of a winning ticket.
    pub prize_table: Vec<PrizeTier>,
}

impl From<TicketKind> for TicketTierDto {
    fn from(kind: TicketKind) -> Self {
        let tier = kind.definition();
        Self {
            ticket_type: kind,
            cost: tier.cost,
            currency: tier.currency,
            win_chance: tier.win_chance,
            prize_table: tier.prize_table,
        }
    }
}
