//! Tenant connection registry.
//!
//! Owns every live connection's outbox and its registration record. A
//! connection is opened unassociated; it only receives or triggers tenant
//! events after [`ConnectionRegistry::register`]. Records are looked up by
//! [`ConnectionId`]; transports keep nothing but the id.

use super::event::{QueueEvent, Role};
use crate::error::{FilaError, FilaResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

/// Sending half of a connection's event queue.
pub type Outbox = mpsc::Sender<QueueEvent>;

/// Receiving half, drained by the transport.
pub type Inbox = mpsc::Receiver<QueueEvent>;

/// Identifier of a live connection. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Registration record for a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub connection_id: ConnectionId,
    pub tenant_id: String,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

struct Slot {
    outbox: Outbox,
    registration: Option<Registration>,
}

#[derive(Default)]
struct RegistryState {
    slots: HashMap<ConnectionId, Slot>,
    tenants: HashMap<String, HashSet<ConnectionId>>,
}

impl RegistryState {
    /// Remove `id` from its tenant's member set, dropping empty sets.
    fn detach(&mut self, id: ConnectionId) -> Option<Registration> {
        let registration = self.slots.get_mut(&id)?.registration.take()?;
        if let Some(members) = self.tenants.get_mut(&registration.tenant_id) {
            members.remove(&id);
            if members.is_empty() {
                self.tenants.remove(&registration.tenant_id);
            }
        }
        Some(registration)
    }
}

/// Tracks which connections belong to which tenant.
pub struct ConnectionRegistry {
    state: RwLock<RegistryState>,
    next_id: AtomicU64,
    outbox_capacity: usize,
}

impl ConnectionRegistry {
    /// Create a registry whose outboxes buffer up to `outbox_capacity` events.
    pub fn new(outbox_capacity: usize) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            next_id: AtomicU64::new(1),
            outbox_capacity: outbox_capacity.max(1),
        }
    }

    /// Open a new, unassociated connection.
    pub async fn open(&self) -> (ConnectionId, Inbox) {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (outbox, inbox) = mpsc::channel(self.outbox_capacity);
        self.state.write().await.slots.insert(
            id,
            Slot {
                outbox,
                registration: None,
            },
        );
        debug!(connection = %id, "Connection opened");
        (id, inbox)
    }

    /// Associate a connection with a tenant and role.
    ///
    /// A connection already registered elsewhere is moved: its old membership
    /// is removed under the same lock that adds the new one.
    pub async fn register(
        &self,
        id: ConnectionId,
        tenant_id: &str,
        role: Role,
    ) -> FilaResult<Registration> {
        let tenant_id = tenant_id.trim();
        if tenant_id.is_empty() {
            return Err(FilaError::invalid("tenant_id is required"));
        }

        let mut state = self.state.write().await;
        if !state.slots.contains_key(&id) {
            return Err(FilaError::NotFound(format!("Connection: {}", id)));
        }

        if let Some(previous) = state.detach(id) {
            if previous.tenant_id != tenant_id {
                info!(
                    connection = %id,
                    from = %previous.tenant_id,
                    to = %tenant_id,
                    "Connection moved to another tenant"
                );
            }
        }

        let registration = Registration {
            connection_id: id,
            tenant_id: tenant_id.to_string(),
            role,
            joined_at: Utc::now(),
        };
        state
            .tenants
            .entry(registration.tenant_id.clone())
            .or_default()
            .insert(id);
        if let Some(slot) = state.slots.get_mut(&id) {
            slot.registration = Some(registration.clone());
        }

        info!(connection = %id, tenant = %tenant_id, role = %role, "Connection registered");
        Ok(registration)
    }

    /// Drop a connection's tenant membership but keep it open.
    pub async fn leave(&self, id: ConnectionId) -> Option<Registration> {
        let previous = self.state.write().await.detach(id);
        if let Some(reg) = &previous {
            debug!(connection = %id, tenant = %reg.tenant_id, "Connection left tenant");
        }
        previous
    }

    /// Forget a connection entirely. Safe to call more than once.
    pub async fn unregister(&self, id: ConnectionId) -> Option<Registration> {
        let mut state = self.state.write().await;
        let previous = state.detach(id);
        if state.slots.remove(&id).is_some() {
            debug!(connection = %id, "Connection closed");
        }
        previous
    }

    /// Current registration, if any.
    pub async fn registration(&self, id: ConnectionId) -> Option<Registration> {
        self.state
            .read()
            .await
            .slots
            .get(&id)
            .and_then(|slot| slot.registration.clone())
    }

    /// Registration of a connection that is about to act on tenant data.
    pub async fn require_registration(&self, id: ConnectionId) -> FilaResult<Registration> {
        self.registration(id).await.ok_or_else(|| {
            FilaError::Unidentified(format!("{} must join a tenant first", id))
        })
    }

    /// Connections currently registered under `tenant_id`.
    pub async fn members_of(&self, tenant_id: &str) -> HashSet<ConnectionId> {
        self.state
            .read()
            .await
            .tenants
            .get(tenant_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Outboxes of the tenant's members, snapshotted under one read lock.
    pub(crate) async fn outboxes_of(&self, tenant_id: &str) -> Vec<(ConnectionId, Outbox)> {
        let state = self.state.read().await;
        let Some(members) = state.tenants.get(tenant_id) else {
            return Vec::new();
        };
        members
            .iter()
            .filter_map(|id| state.slots.get(id).map(|slot| (*id, slot.outbox.clone())))
            .collect()
    }

    /// Number of open connections, registered or not.
    pub async fn connection_count(&self) -> usize {
        self.state.read().await.slots.len()
    }

    /// Number of tenants with at least one registered connection.
    pub async fn tenant_count(&self) -> usize {
        self.state.read().await.tenants.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(64)
    }
}
