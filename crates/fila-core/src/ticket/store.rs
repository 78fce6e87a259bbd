//! Tenant-scoped ticket store over the database pool.

use super::model::{format_timestamp, generate_display_code, NewTicket, Ticket, TicketStatus};
use crate::error::FilaResult;
use chrono::{DateTime, Utc};
use fila_db::queries::tickets::{self as queries, TicketRow};
use fila_db::DbPool;
use uuid::Uuid;

/// Durable ticket records. Source of truth for status and ordering fields.
#[derive(Clone)]
pub struct TicketStore {
    pool: DbPool,
}

impl TicketStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Build the row for a new waiting ticket without persisting it.
    pub fn prepare(tenant_id: &str, input: &NewTicket, now: DateTime<Utc>) -> TicketRow {
        let ts = format_timestamp(now);
        TicketRow {
            id: Uuid::now_v7().to_string(),
            tenant_id: tenant_id.to_string(),
            subject_name: input.subject_name.clone(),
            code: generate_display_code(input.priority),
            priority: input.priority,
            specialty: input.specialty.clone(),
            status: TicketStatus::Waiting.as_str().to_string(),
            room: None,
            created_at: ts.clone(),
            updated_at: ts,
            called_at: None,
        }
    }

    /// Persist a prepared row.
    pub async fn insert(&self, row: &TicketRow) -> FilaResult<Ticket> {
        queries::insert_ticket(&self.pool, row).await?;
        Ticket::from_row(row.clone())
    }

    pub async fn get(&self, tenant_id: &str, id: &str) -> FilaResult<Ticket> {
        let row = queries::get_ticket(&self.pool, tenant_id, id).await?;
        Ticket::from_row(row)
    }

    /// Waiting tickets of the tenant. Callers apply [`crate::queue::waiting_list`] for display order.
    pub async fn waiting(&self, tenant_id: &str) -> FilaResult<Vec<Ticket>> {
        queries::list_waiting(&self.pool, tenant_id)
            .await?
            .into_iter()
            .map(Ticket::from_row)
            .collect()
    }

    /// Every ticket of the tenant, newest first.
    pub async fn all(&self, tenant_id: &str) -> FilaResult<Vec<Ticket>> {
        queries::list_tickets(&self.pool, tenant_id)
            .await?
            .into_iter()
            .map(Ticket::from_row)
            .collect()
    }

    /// Conditionally move a waiting ticket to `called`.
    pub async fn mark_called(
        &self,
        tenant_id: &str,
        id: &str,
        room: &str,
        at: DateTime<Utc>,
    ) -> FilaResult<Ticket> {
        let row = queries::mark_called(&self.pool, tenant_id, id, room, &format_timestamp(at)).await?;
        Ticket::from_row(row)
    }

    pub async fn count(&self, tenant_id: &str, status: TicketStatus) -> FilaResult<i64> {
        Ok(queries::count_by_status(&self.pool, tenant_id, status.as_str()).await?)
    }
}
