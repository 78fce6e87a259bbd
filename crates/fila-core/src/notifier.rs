//! Event notifiers.
//!
//! The ticket service hands every successful change to a [`Notifier`]. Inside
//! the server that is the in-process [`Dispatcher`](crate::realtime::Dispatcher);
//! the CLI uses [`WebNotifier`] to relay events to a running server over HTTP.

use crate::realtime::QueueEvent;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Receives queue events for a tenant. Delivery is best effort and never
/// reports failure back to the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, tenant_id: &str, event: QueueEvent);
}

/// Notifier that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _tenant_id: &str, _event: QueueEvent) {}
}

/// Notifies the web server of changes via HTTP.
#[derive(Clone)]
pub struct WebNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl WebNotifier {
    /// Create a notifier for the server at `base_url` (see
    /// [`FilaConfig::web_url`](crate::FilaConfig)).
    pub fn with_url(base_url: &str) -> Self {
        debug!(base_url = %base_url, "WebNotifier initialized");
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(2))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Notifier for WebNotifier {
    /// POST the event to `/internal/notify`, which relays it to the tenant's
    /// live connections.
    async fn notify(&self, tenant_id: &str, event: QueueEvent) {
        let url = format!("{}/internal/notify", self.base_url);
        let payload = serde_json::json!({
            "tenant_id": tenant_id,
            "event": event,
        });

        debug!(url = %url, tenant = %tenant_id, event = event.name(), "Sending notification");

        match self.client.post(&url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(tenant = %tenant_id, "Notification relayed");
            }
            Ok(response) => {
                warn!(
                    tenant = %tenant_id,
                    status_code = %response.status(),
                    "Notification relay failed with status"
                );
            }
            Err(e) => {
                // Expected when `fila serve` is not running.
                debug!(
                    tenant = %tenant_id,
                    error = %e,
                    url = %url,
                    "Failed to relay notification (fila serve may not be running)"
                );
            }
        }
    }
}
