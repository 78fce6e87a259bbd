//! Ticket route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use fila_core::ticket::model::DEFAULT_SPECIALTY;
use fila_core::{NewTicket, Ticket};
use serde::Deserialize;

use crate::error::ApiError;
use crate::identity::Identity;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateTicketRequest {
    pub subject_name: String,
    #[serde(default)]
    pub priority: bool,
    pub specialty: Option<String>,
}

#[derive(Deserialize)]
pub struct CallTicketRequest {
    pub room: String,
}

pub async fn create_ticket(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let input = NewTicket::new(
        req.subject_name,
        req.priority,
        req.specialty.unwrap_or_else(|| DEFAULT_SPECIALTY.to_string()),
    );
    let ticket = state.tickets.create_ticket(&identity.tenant_id, input).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn list_waiting(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    let tickets = state.tickets.list_waiting(&identity.tenant_id).await?;
    Ok(Json(tickets))
}

pub async fn list_tickets(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    let tickets = state.tickets.list_tickets(&identity.tenant_id).await?;
    Ok(Json(tickets))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket = state.tickets.get_ticket(&identity.tenant_id, &id).await?;
    Ok(Json(ticket))
}

pub async fn call_ticket(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(req): Json<CallTicketRequest>,
) -> Result<Json<Ticket>, ApiError> {
    identity.require_caller()?;
    let ticket = state
        .tickets
        .call_ticket(&identity.tenant_id, &id, &req.room)
        .await?;
    Ok(Json(ticket))
}
