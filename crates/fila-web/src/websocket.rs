//! WebSocket transport for callers and displays.
//!
//! Each socket is opened in the connection registry as soon as it upgrades,
//! but stays unassociated until it sends `join`. Queue events for its tenant
//! arrive through the registry outbox; replies to its own requests go through
//! a separate channel so both share one writer.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use fila_core::realtime::{ConnectionId, Role};
use fila_core::{FilaError, FilaResult, Ticket};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Messages a client may send.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Associate this connection with a tenant.
    Join { tenant_id: String, role: Role },
    /// Drop the tenant association.
    Leave,
    /// Call a waiting ticket. Callers only.
    CallTicket { ticket_id: String, room: String },
    /// Fetch the current waiting list, e.g. after (re)joining.
    ListWaiting,
}

/// Direct replies to a client's own messages.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    Joined {
        connection_id: ConnectionId,
        tenant_id: String,
        role: Role,
    },
    Left,
    Waiting { tickets: Vec<Ticket> },
    CallResult { ticket: Ticket },
    Error { kind: String, message: String },
}

impl From<FilaError> for ServerMessage {
    fn from(err: FilaError) -> Self {
        Self::Error {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (connection, mut inbox) = state.registry.open().await;
    let (reply_tx, mut reply_rx) = mpsc::channel::<ServerMessage>(16);

    let connections = state.registry.connection_count().await;
    info!(connection = %connection, connections, "WebSocket client connected");

    // Forward tenant events and direct replies to this client
    let send_task = tokio::spawn(async move {
        loop {
            let json = tokio::select! {
                Some(event) = inbox.recv() => serde_json::to_string(&event),
                Some(reply) = reply_rx.recv() => serde_json::to_string(&reply),
                else => break,
            };
            let json = match json {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "Failed to encode outgoing message");
                    continue;
                }
            };
            debug!(connection = %connection, message = %json, "Sending message to WebSocket client");
            if sender.send(Message::Text(json.into())).await.is_err() {
                debug!(connection = %connection, "WebSocket send failed, client disconnected");
                break;
            }
        }
    });

    // Handle incoming messages from client
    let recv_state = state.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    debug!(connection = %connection, "Received from WebSocket client: {}", text);
                    let reply = handle_text(&recv_state, connection, text.as_str()).await;
                    if reply_tx.send(reply).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => {
                    debug!(connection = %connection, "WebSocket client sent close frame");
                    break;
                }
                _ => {}
            }
        }
    });

    first_of(send_task, recv_task).await;

    state.registry.unregister(connection).await;
    info!(connection = %connection, "WebSocket client disconnected");
}

/// Wait for whichever task finishes first and abort the other, so neither
/// outlives the connection's registration.
async fn first_of(mut a: JoinHandle<()>, mut b: JoinHandle<()>) {
    tokio::select! {
        _ = &mut a => b.abort(),
        _ = &mut b => a.abort(),
    }
}

/// Parse and execute one client text frame.
pub async fn handle_text(state: &AppState, connection: ConnectionId, text: &str) -> ServerMessage {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => return FilaError::invalid(format!("malformed message: {}", e)).into(),
    };
    handle_message(state, connection, message)
        .await
        .unwrap_or_else(ServerMessage::from)
}

/// Execute one client message on behalf of `connection`.
pub async fn handle_message(
    state: &AppState,
    connection: ConnectionId,
    message: ClientMessage,
) -> FilaResult<ServerMessage> {
    match message {
        ClientMessage::Join { tenant_id, role } => {
            let registration = state.registry.register(connection, &tenant_id, role).await?;
            Ok(ServerMessage::Joined {
                connection_id: registration.connection_id,
                tenant_id: registration.tenant_id,
                role: registration.role,
            })
        }
        ClientMessage::Leave => {
            state.registry.leave(connection).await;
            Ok(ServerMessage::Left)
        }
        ClientMessage::CallTicket { ticket_id, room } => {
            let registration = state.registry.require_registration(connection).await?;
            if !registration.role.can_call() {
                warn!(connection = %connection, tenant = %registration.tenant_id, "Display tried to call a ticket");
                return Err(FilaError::Forbidden(format!(
                    "role '{}' cannot call tickets",
                    registration.role
                )));
            }
            let ticket = state
                .tickets
                .call_ticket(&registration.tenant_id, &ticket_id, &room)
                .await?;
            Ok(ServerMessage::CallResult { ticket })
        }
        ClientMessage::ListWaiting => {
            let registration = state.registry.require_registration(connection).await?;
            let tickets = state.tickets.list_waiting(&registration.tenant_id).await?;
            Ok(ServerMessage::Waiting { tickets })
        }
    }
}
