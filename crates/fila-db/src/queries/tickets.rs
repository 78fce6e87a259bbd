//! Ticket queries.
//!
//! Every query is scoped by `tenant_id`. Lookups by id check the owning
//! tenant and fail with [`DbError::Forbidden`] on mismatch, so a caller can
//! never read or change another tenant's ticket through this module.

use crate::pool::{DbError, DbPool, DbResult};
use serde::Serialize;
use sqlx::FromRow;

const COLUMNS: &str = "id, tenant_id, subject_name, code, priority, specialty, status,
        room, created_at, updated_at, called_at";

/// Ticket row from database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct TicketRow {
    pub id: String,
    pub tenant_id: String,
    pub subject_name: String,
    pub code: String,
    pub priority: bool,
    pub specialty: String,
    pub status: String,
    pub room: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub called_at: Option<String>,
}

/// Insert a new ticket. The row is stored as given; callers set `status` to
/// `waiting` and both timestamps to the creation time.
pub async fn insert_ticket(pool: &DbPool, row: &TicketRow) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO tickets (id, tenant_id, subject_name, code, priority, specialty,
                              status, room, created_at, updated_at, called_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )
    .bind(&row.id)
    .bind(&row.tenant_id)
    .bind(&row.subject_name)
    .bind(&row.code)
    .bind(row.priority)
    .bind(&row.specialty)
    .bind(&row.status)
    .bind(&row.room)
    .bind(&row.created_at)
    .bind(&row.updated_at)
    .bind(&row.called_at)
    .execute(pool)
    .await?;
    Ok(())
}

async fn find_ticket(pool: &DbPool, id: &str) -> DbResult<Option<TicketRow>> {
    let sql = format!("SELECT {COLUMNS} FROM tickets WHERE id = ?1");
    Ok(sqlx::query_as::<_, TicketRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

fn check_owner(row: Option<TicketRow>, tenant_id: &str, id: &str) -> DbResult<TicketRow> {
    match row {
        Some(row) if row.tenant_id == tenant_id => Ok(row),
        Some(row) => Err(DbError::Forbidden(format!(
            "Ticket {} belongs to tenant {}, not {}",
            id, row.tenant_id, tenant_id
        ))),
        None => Err(DbError::NotFound(format!("Ticket: {}", id))),
    }
}

/// Get a ticket by ID, as seen by `tenant_id`.
pub async fn get_ticket(pool: &DbPool, tenant_id: &str, id: &str) -> DbResult<TicketRow> {
    check_owner(find_ticket(pool, id).await?, tenant_id, id)
}

/// List waiting tickets for a tenant, priority first, then arrival.
pub async fn list_waiting(pool: &DbPool, tenant_id: &str) -> DbResult<Vec<TicketRow>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM tickets WHERE tenant_id = ?1 AND status = 'waiting'
         ORDER BY priority DESC, created_at ASC, id ASC"
    );
    Ok(sqlx::query_as::<_, TicketRow>(&sql)
        .bind(tenant_id)
        .fetch_all(pool)
        .await?)
}

/// List every ticket of a tenant, newest first.
pub async fn list_tickets(pool: &DbPool, tenant_id: &str) -> DbResult<Vec<TicketRow>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM tickets WHERE tenant_id = ?1 ORDER BY created_at DESC, id DESC"
    );
    Ok(sqlx::query_as::<_, TicketRow>(&sql)
        .bind(tenant_id)
        .fetch_all(pool)
        .await?)
}

/// Count a tenant's tickets in `status`.
pub async fn count_by_status(pool: &DbPool, tenant_id: &str, status: &str) -> DbResult<i64> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM tickets WHERE tenant_id = ?1 AND status = ?2")
            .bind(tenant_id)
            .bind(status)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Move a waiting ticket to `called`.
///
/// The single conditional update only matches rows still in `waiting`, so of
/// several concurrent callers exactly one gets the row back; the others get
/// [`DbError::Conflict`].
pub async fn mark_called(
    pool: &DbPool,
    tenant_id: &str,
    id: &str,
    room: &str,
    called_at: &str,
) -> DbResult<TicketRow> {
    let sql = format!(
        "UPDATE tickets
         SET status = 'called', room = ?3, called_at = ?4, updated_at = ?4
         WHERE id = ?1 AND tenant_id = ?2 AND status = 'waiting'
         RETURNING {COLUMNS}"
    );
    let updated = sqlx::query_as::<_, TicketRow>(&sql)
        .bind(id)
        .bind(tenant_id)
        .bind(room)
        .bind(called_at)
        .fetch_optional(pool)
        .await?;

    match updated {
        Some(row) => Ok(row),
        None => {
            // Nothing matched: tell a foreign or missing ticket from a lost race.
            check_owner(find_ticket(pool, id).await?, tenant_id, id)?;
            Err(DbError::Conflict(format!("Ticket {} already called", id)))
        }
    }
}
