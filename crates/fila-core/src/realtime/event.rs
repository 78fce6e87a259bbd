//! Events pushed to connected callers and displays.

use crate::ticket::model::Ticket;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FilaError;

/// Queue event delivered to a tenant's connections.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum QueueEvent {
    /// A ticket was called to a room.
    TicketCalled {
        ticket: Ticket,
        assigned_room: String,
        called_at: DateTime<Utc>,
    },
    /// A ticket joined the waiting list.
    TicketCreated { ticket: Ticket },
}

impl QueueEvent {
    /// Event name, as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TicketCalled { .. } => "ticket_called",
            Self::TicketCreated { .. } => "ticket_created",
        }
    }

    pub fn ticket(&self) -> &Ticket {
        match self {
            Self::TicketCalled { ticket, .. } | Self::TicketCreated { ticket } => ticket,
        }
    }
}

/// What a registered connection is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Front desk or office that calls tickets.
    Caller,
    /// Waiting-room screen.
    Display,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Caller => "caller",
            Self::Display => "display",
        }
    }

    /// Only callers may trigger a call.
    pub fn can_call(&self) -> bool {
        matches!(self, Self::Caller)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = FilaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "caller" => Ok(Self::Caller),
            "display" => Ok(Self::Display),
            other => Err(FilaError::invalid(format!(
                "Unknown role '{}'. Valid roles: caller, display",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("Display".parse::<Role>().unwrap(), Role::Display);
        assert_eq!(" caller".parse::<Role>().unwrap(), Role::Caller);
        assert!("admin".parse::<Role>().is_err());
        assert!(Role::Caller.can_call());
        assert!(!Role::Display.can_call());
    }
}
