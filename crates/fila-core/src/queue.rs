//! Waiting-list ordering.
//!
//! The order is recomputed from the store on every query: priority tickets
//! first, then by arrival, then by id so equal timestamps stay deterministic.

use crate::ticket::model::Ticket;
use std::cmp::Ordering;

/// Compare two tickets by queue position.
pub fn queue_order(a: &Ticket, b: &Ticket) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Keep only waiting tickets and sort them by queue position.
pub fn waiting_list(tickets: impl IntoIterator<Item = Ticket>) -> Vec<Ticket> {
    let mut waiting: Vec<Ticket> = tickets.into_iter().filter(Ticket::is_waiting).collect();
    waiting.sort_by(queue_order);
    waiting
}

/// 1-based position of `ticket_id` in an ordered waiting list.
pub fn position_of(waiting: &[Ticket], ticket_id: &str) -> Option<usize> {
    waiting.iter().position(|t| t.id == ticket_id).map(|i| i + 1)
}
