//! Ticket domain models.

use crate::error::{FilaError, FilaResult};
use chrono::{DateTime, SecondsFormat, Utc};
use fila_db::queries::tickets::TicketRow;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Specialty used when a caller does not name one.
pub const DEFAULT_SPECIALTY: &str = "Clínico Geral";

/// A ticket in a tenant's waiting queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub tenant_id: String,
    pub display_code: String,
    pub subject_name: String,
    pub priority: bool,
    pub specialty: String,
    pub status: TicketStatus,
    pub assigned_room: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub called_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Create a Ticket from a database row.
    pub fn from_row(row: TicketRow) -> FilaResult<Self> {
        Ok(Self {
            status: TicketStatus::parse(&row.status)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            called_at: row.called_at.as_deref().map(parse_timestamp).transpose()?,
            id: row.id,
            tenant_id: row.tenant_id,
            display_code: row.code,
            subject_name: row.subject_name,
            priority: row.priority,
            specialty: row.specialty,
            assigned_room: row.room,
        })
    }

    pub fn is_waiting(&self) -> bool {
        self.status == TicketStatus::Waiting
    }
}

/// Ticket status. `Called` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Waiting,
    Called,
}

impl TicketStatus {
    /// Parse the stored status string.
    pub fn parse(s: &str) -> FilaResult<Self> {
        match s {
            "waiting" => Ok(Self::Waiting),
            "called" => Ok(Self::Called),
            other => Err(FilaError::Internal(format!("Unknown ticket status '{}'", other))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Called => "called",
        }
    }

    /// Check if transition to another status is valid.
    pub fn can_transition_to(&self, to: &Self) -> bool {
        matches!((self, to), (Self::Waiting, Self::Called))
    }
}

/// Input for creating a ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub subject_name: String,
    #[serde(default)]
    pub priority: bool,
    #[serde(default = "default_specialty")]
    pub specialty: String,
}

fn default_specialty() -> String {
    DEFAULT_SPECIALTY.to_string()
}

impl NewTicket {
    pub fn new(subject_name: impl Into<String>, priority: bool, specialty: impl Into<String>) -> Self {
        Self {
            subject_name: subject_name.into(),
            priority,
            specialty: specialty.into(),
        }
    }

    /// Trim text fields and reject empty ones.
    pub fn validated(self) -> FilaResult<Self> {
        let subject_name = self.subject_name.trim().to_string();
        if subject_name.is_empty() {
            return Err(FilaError::invalid("subject_name is required"));
        }
        let specialty = self.specialty.trim().to_string();
        if specialty.is_empty() {
            return Err(FilaError::invalid("specialty is required"));
        }
        Ok(Self {
            subject_name,
            priority: self.priority,
            specialty,
        })
    }
}

/// Short advisory code: `P` or `N` followed by a number in `01..=99`.
///
/// Codes repeat; a ticket is identified by its `id` only.
pub fn generate_display_code(priority: bool) -> String {
    let number: u8 = rand::thread_rng().gen_range(1..=99);
    format!("{}{:02}", if priority { 'P' } else { 'N' }, number)
}

/// Timestamp format used in storage. Fixed width, so it also sorts as text.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> FilaResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| FilaError::Internal(format!("Bad timestamp '{}': {}", raw, e)))
}
