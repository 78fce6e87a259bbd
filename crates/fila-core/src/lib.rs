//! Fila Core Library
//!
//! Domain model and business logic for a multi-tenant waiting queue: ticket
//! lifecycle, queue ordering, and tenant-isolated real-time dispatch.

pub mod config;
pub mod error;
pub mod notifier;
pub mod queue;
pub mod realtime;
pub mod ticket;

pub use config::FilaConfig;
pub use error::{FilaError, FilaResult};
pub use notifier::{Notifier, NullNotifier, WebNotifier};
pub use ticket::model::{NewTicket, Ticket, TicketStatus};
pub use ticket::{RetryPolicy, TicketService};
