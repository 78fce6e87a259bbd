//! Internal notification and health endpoints.

use axum::{extract::State, Json};
use fila_core::realtime::{DispatchReport, QueueEvent};
use fila_core::FilaError;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Event relayed from another process, such as the CLI.
#[derive(Deserialize)]
pub struct NotifyRequest {
    pub tenant_id: String,
    pub event: QueueEvent,
}

/// Receive a notification and dispatch it to the tenant's connections.
///
/// The posted event only names a ticket. What gets dispatched is rebuilt from
/// the store, and a `ticket_called` is refused unless the stored ticket has
/// actually been called.
pub async fn notify(
    State(state): State<AppState>,
    Json(req): Json<NotifyRequest>,
) -> Result<Json<DispatchReport>, ApiError> {
    let posted = req.event.ticket();
    if posted.tenant_id != req.tenant_id {
        return Err(FilaError::Forbidden(format!(
            "event for tenant {} cannot be relayed to {}",
            posted.tenant_id, req.tenant_id
        ))
        .into());
    }

    let stored = state.tickets.get_ticket(&req.tenant_id, &posted.id).await?;
    let event = match req.event {
        QueueEvent::TicketCreated { .. } => QueueEvent::TicketCreated { ticket: stored },
        QueueEvent::TicketCalled { .. } => match (stored.assigned_room.clone(), stored.called_at) {
            (Some(assigned_room), Some(called_at)) => QueueEvent::TicketCalled {
                ticket: stored,
                assigned_room,
                called_at,
            },
            _ => {
                warn!(tenant = %req.tenant_id, ticket = %stored.id, "Refused relay of a call that did not happen");
                return Err(FilaError::invalid(format!(
                    "ticket {} has not been called",
                    stored.id
                ))
                .into());
            }
        },
    };

    info!(
        tenant = %req.tenant_id,
        event = event.name(),
        "Received internal notification"
    );
    let report = state.dispatcher.dispatch(&req.tenant_id, &event).await;
    Ok(Json(report))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "connections": state.registry.connection_count().await,
        "tenants": state.registry.tenant_count().await,
    }))
}
