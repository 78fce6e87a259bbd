//! Tenant-scoped event dispatch.

use super::event::QueueEvent;
use super::registry::ConnectionRegistry;
use crate::notifier::Notifier;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

/// Outcome of one dispatch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Delivers events to the connections registered under a tenant, and only
/// to those. Holds no state of its own.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Send `event` to every current member of `tenant_id`.
    ///
    /// Each delivery is independent: a full or closed outbox is logged and
    /// skipped. Connections that register later do not see this event.
    pub async fn dispatch(&self, tenant_id: &str, event: &QueueEvent) -> DispatchReport {
        let targets = self.registry.outboxes_of(tenant_id).await;
        let mut report = DispatchReport::default();

        for (connection, outbox) in targets {
            match outbox.try_send(event.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    report.failed += 1;
                    warn!(
                        connection = %connection,
                        tenant = %tenant_id,
                        event = event.name(),
                        "Outbox full, event dropped"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    report.failed += 1;
                    debug!(
                        connection = %connection,
                        tenant = %tenant_id,
                        event = event.name(),
                        "Outbox closed, connection is going away"
                    );
                }
            }
        }

        debug!(
            tenant = %tenant_id,
            event = event.name(),
            delivered = report.delivered,
            failed = report.failed,
            "Event dispatched"
        );
        report
    }
}

#[async_trait]
impl Notifier for Dispatcher {
    async fn notify(&self, tenant_id: &str, event: QueueEvent) {
        self.dispatch(tenant_id, &event).await;
    }
}
