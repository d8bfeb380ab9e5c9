use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{delete, get, patch},
};
use axum_extra::extract::WithRejection;
use db::{
    models::ticket::{PriorityOption, Ticket, TicketStatus},
    validation::validate_ticket_status,
};
use serde::Deserialize;
use services::services::ticket_editor::{SubmittedTicket, TicketEditor, TicketForm};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

const INVALID_TICKET_ID: &str = "Invalid ticket ID";

#[derive(Debug, Deserialize)]
pub struct TicketListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateTicketStatus {
    pub status: String,
}

/// Accepts only a well-formed UUID; clients that lost the id send `""` or
/// `"undefined"`.
fn parse_ticket_id(raw: &str) -> Result<Uuid, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "undefined" {
        return Err(ApiError::BadRequest(INVALID_TICKET_ID.to_string()));
    }
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(INVALID_TICKET_ID.to_string()))
}

fn parse_status(raw: &str) -> Result<TicketStatus, ApiError> {
    validate_ticket_status(raw)?;
    TicketStatus::from_str(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

pub async fn list_tickets(
    State(state): State<AppState>,
    Query(query): Query<TicketListQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Ticket>>>, ApiError> {
    let tickets = match query.status.as_deref() {
        Some(raw) => state.store().list_by_status(parse_status(raw)?).await?,
        None => state.store().list_all().await?,
    };
    Ok(ResponseJson(ApiResponse::success(tickets)))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<Ticket>>, ApiError> {
    let id = parse_ticket_id(&ticket_id)?;
    let ticket = state
        .store()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Ticket not found: {id}")))?;
    Ok(ResponseJson(ApiResponse::success(ticket)))
}

pub async fn create_ticket(
    State(state): State<AppState>,
    WithRejection(Json(form), _): WithRejection<Json<TicketForm>, ApiError>,
) -> Result<ResponseJson<ApiResponse<SubmittedTicket>>, ApiError> {
    let submitted = TicketEditor::create(form).submit(state.store()).await?;
    tracing::info!(ticket_id = %submitted.ticket.id, "Ticket created");
    Ok(ResponseJson(ApiResponse::success(submitted)))
}

pub async fn update_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
    WithRejection(Json(form), _): WithRejection<Json<TicketForm>, ApiError>,
) -> Result<ResponseJson<ApiResponse<SubmittedTicket>>, ApiError> {
    let id = parse_ticket_id(&ticket_id)?;
    let submitted = TicketEditor::edit(id, form).submit(state.store()).await?;
    Ok(ResponseJson(ApiResponse::success(submitted)))
}

/// Persist a board drag.
pub async fn update_ticket_status(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateTicketStatus>, ApiError>,
) -> Result<ResponseJson<ApiResponse<Ticket>>, ApiError> {
    let id = parse_ticket_id(&ticket_id)?;
    let status = parse_status(&payload.status)?;
    let ticket = state.store().update_status(id, status).await?;
    tracing::debug!(ticket_id = %id, status = %status, "Ticket moved");
    Ok(ResponseJson(ApiResponse::success(ticket)))
}

/// Succeeds whether or not a row matched.
pub async fn delete_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let id = parse_ticket_id(&ticket_id)?;
    let rows = state.store().delete(id).await?;
    tracing::info!(ticket_id = %id, rows, "Ticket deleted");
    Ok(ResponseJson(ApiResponse::ok()))
}

/// Priority choices for the editor, with their P0-P3 badges.
pub async fn list_priorities() -> ResponseJson<ApiResponse<Vec<PriorityOption>>> {
    ResponseJson(ApiResponse::success(PriorityOption::all()))
}

async fn delete_ticket_without_id() -> ApiError {
    ApiError::BadRequest(INVALID_TICKET_ID.to_string())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tickets", get(list_tickets).post(create_ticket))
        .route("/tickets/", delete(delete_ticket_without_id))
        .route("/tickets/priorities", get(list_priorities))
        .route(
            "/tickets/{ticket_id}",
            get(get_ticket).put(update_ticket).delete(delete_ticket),
        )
        .route("/tickets/{ticket_id}/status", patch(update_ticket_status))
}
