//! Ticket lifecycle.
//!
//! A ticket is created `waiting` and can be called exactly once. The store's
//! conditional update decides which of several concurrent calls wins; every
//! loser gets [`FilaError::AlreadyCalled`] and triggers no event.

pub mod model;
pub mod store;

use crate::error::{FilaError, FilaResult};
use crate::notifier::Notifier;
use crate::queue;
use crate::realtime::QueueEvent;
use chrono::Utc;
use fila_db::DbPool;
use model::{NewTicket, Ticket, TicketStatus};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use store::TicketStore;
use tracing::{info, warn};

/// Bounded retry for transient store failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_millis(50),
        }
    }
}

/// Creates and calls tickets, then notifies the tenant's connections.
#[derive(Clone)]
pub struct TicketService {
    store: TicketStore,
    notifier: Arc<dyn Notifier>,
    retry: RetryPolicy,
}

impl TicketService {
    pub fn new(pool: DbPool, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store: TicketStore::new(pool),
            notifier,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn store(&self) -> &TicketStore {
        &self.store
    }

    /// Create a waiting ticket and announce it to the tenant.
    pub async fn create_ticket(&self, tenant_id: &str, input: NewTicket) -> FilaResult<Ticket> {
        let tenant_id = require_tenant(tenant_id)?;
        let input = input.validated()?;

        // Prepared once so a retried insert reuses the same id and code.
        let row = TicketStore::prepare(tenant_id, &input, Utc::now());
        let row = &row;
        let ticket = self
            .retrying("create_ticket", move || self.store.insert(row))
            .await?;

        info!(
            tenant = %tenant_id,
            ticket = %ticket.id,
            code = %ticket.display_code,
            priority = ticket.priority,
            "Ticket created"
        );

        self.notifier
            .notify(tenant_id, QueueEvent::TicketCreated { ticket: ticket.clone() })
            .await;
        Ok(ticket)
    }

    /// Call a waiting ticket to `room`.
    pub async fn call_ticket(&self, tenant_id: &str, ticket_id: &str, room: &str) -> FilaResult<Ticket> {
        let tenant_id = require_tenant(tenant_id)?;
        let room = room.trim();
        if room.is_empty() {
            return Err(FilaError::invalid("room is required"));
        }

        let current = self.get_ticket(tenant_id, ticket_id).await?;
        if !current.status.can_transition_to(&TicketStatus::Called) {
            return Err(FilaError::AlreadyCalled(format!(
                "Ticket {} was already called to {}",
                current.display_code,
                current.assigned_room.as_deref().unwrap_or("-")
            )));
        }

        let called_at = Utc::now();
        let ticket = self
            .retrying("call_ticket", move || {
                self.store.mark_called(tenant_id, ticket_id, room, called_at)
            })
            .await
            .map_err(|e| self.log_denied(tenant_id, ticket_id, e))?;

        info!(
            tenant = %tenant_id,
            ticket = %ticket.id,
            code = %ticket.display_code,
            room = %room,
            "Ticket called"
        );

        self.notifier
            .notify(
                tenant_id,
                QueueEvent::TicketCalled {
                    ticket: ticket.clone(),
                    assigned_room: room.to_string(),
                    called_at,
                },
            )
            .await;
        Ok(ticket)
    }

    /// Load one ticket owned by `tenant_id`.
    pub async fn get_ticket(&self, tenant_id: &str, ticket_id: &str) -> FilaResult<Ticket> {
        let tenant_id = require_tenant(tenant_id)?;
        self.retrying("get_ticket", move || self.store.get(tenant_id, ticket_id))
            .await
            .map_err(|e| self.log_denied(tenant_id, ticket_id, e))
    }

    /// Waiting list in queue order.
    pub async fn list_waiting(&self, tenant_id: &str) -> FilaResult<Vec<Ticket>> {
        let tenant_id = require_tenant(tenant_id)?;
        let tickets = self
            .retrying("list_waiting", move || self.store.waiting(tenant_id))
            .await?;
        Ok(queue::waiting_list(tickets))
    }

    /// Every ticket of the tenant, newest first. Read-only, for reporting.
    pub async fn list_tickets(&self, tenant_id: &str) -> FilaResult<Vec<Ticket>> {
        let tenant_id = require_tenant(tenant_id)?;
        self.retrying("list_tickets", move || self.store.all(tenant_id)).await
    }

    async fn retrying<T, F, Fut>(&self, op: &'static str, mut attempt: F) -> FilaResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = FilaResult<T>>,
    {
        let mut tries = 0;
        loop {
            match attempt().await {
                Err(e) if e.is_retryable() && tries < self.retry.max_retries => {
                    tries += 1;
                    warn!(op, attempt = tries, error = %e, "Store unavailable, retrying");
                    tokio::time::sleep(self.retry.backoff * tries).await;
                }
                result => return result,
            }
        }
    }

    fn log_denied(&self, tenant_id: &str, ticket_id: &str, err: FilaError) -> FilaError {
        if let FilaError::Forbidden(_) = &err {
            warn!(tenant = %tenant_id, ticket = %ticket_id, "Cross-tenant ticket access denied");
        }
        err
    }
}

fn require_tenant(tenant_id: &str) -> FilaResult<&str> {
    let tenant_id = tenant_id.trim();
    if tenant_id.is_empty() {
        return Err(FilaError::invalid("tenant_id is required"));
    }
    Ok(tenant_id)
}
