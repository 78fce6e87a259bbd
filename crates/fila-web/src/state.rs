//! Application state.

use fila_core::realtime::{ConnectionRegistry, Dispatcher};
use fila_core::{FilaConfig, RetryPolicy, TicketService};
use fila_db::DbPool;
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub tickets: Arc<TicketService>,
    pub registry: Arc<ConnectionRegistry>,
    pub dispatcher: Dispatcher,
}

impl AppState {
    /// Wire the ticket service to an in-process dispatcher over a fresh registry.
    pub fn new(db: DbPool, config: &FilaConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new(config.outbox_capacity));
        let dispatcher = Dispatcher::new(registry.clone());
        let tickets = TicketService::new(db, Arc::new(dispatcher.clone())).with_retry_policy(
            RetryPolicy {
                max_retries: config.store_retries,
                backoff: config.retry_backoff(),
            },
        );

        Self {
            tickets: Arc::new(tickets),
            registry,
            dispatcher,
        }
    }
}
