//! Dashboard summary over the ticket collection.

use std::cmp::Reverse;

use serde::Serialize;

use super::{Ticket, TicketStatus};

/// Number of tickets listed under "recent".
pub const RECENT_LIMIT: usize = 3;

/// Counts and recent activity for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    /// Number of tickets.
    pub total: usize,
    /// Tickets in [`TicketStatus::Open`].
    pub open: usize,
    /// Tickets in [`TicketStatus::InProgress`].
    pub in_progress: usize,
    /// Tickets in [`TicketStatus::Closed`].
    pub closed: usize,
    /// Closed share of the total as a whole percentage, rounded half up.
    pub completion_rate: usize,
    /// Newest tickets by creation time.
    pub recent: Vec<Ticket>,
}

impl TicketStats {
    /// Summarise `tickets`.
    #[must_use]
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        let count = |status: TicketStatus| tickets.iter().filter(|t| t.status == status).count();
        let total = tickets.len();
        let closed = count(TicketStatus::Closed);

        let mut recent = tickets.to_vec();
        recent.sort_by_key(|ticket| Reverse(ticket.created_at));
        recent.truncate(RECENT_LIMIT);

        Self {
            total,
            open: count(TicketStatus::Open),
            in_progress: count(TicketStatus::InProgress),
            closed,
            completion_rate: completion_rate(closed, total),
            recent,
        }
    }
}

fn completion_rate(closed: usize, total: usize) -> usize {
    // round(closed / total * 100) without floats
    closed
        .saturating_mul(200)
        .saturating_add(total)
        .checked_div(total.saturating_mul(2))
        .unwrap_or(0)
}
