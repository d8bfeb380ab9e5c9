use axum::{
    Json, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use db::models::{
    sprint::{Sprint, SprintWithTickets},
    ticket::Ticket,
};
use serde::Deserialize;
use services::services::sprint_plan::{
    ProposedSprint, StartSprintRequest, propose_sprint, start_sprint,
};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, TS)]
pub struct ProposeSprintRequest {
    pub capacity: i64,
}

pub async fn list_sprints(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Sprint>>>, ApiError> {
    let sprints = Sprint::find_all(state.pool()).await?;
    Ok(ResponseJson(ApiResponse::success(sprints)))
}

pub async fn get_sprint(
    State(state): State<AppState>,
    WithRejection(Path(sprint_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<ResponseJson<ApiResponse<SprintWithTickets>>, ApiError> {
    let sprint = Sprint::find_by_id(state.pool(), sprint_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sprint not found: {sprint_id}")))?;
    let tickets = Ticket::find_by_sprint_id(state.pool(), sprint_id).await?;
    Ok(ResponseJson(ApiResponse::success(SprintWithTickets {
        sprint,
        tickets,
    })))
}

/// Ask the planner for a sprint drawn from the current backlog.
pub async fn propose(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<ProposeSprintRequest>, ApiError>,
) -> Result<ResponseJson<ApiResponse<ProposedSprint>>, ApiError> {
    let proposal = propose_sprint(
        state.store(),
        state.workflow(),
        state.settings(),
        payload.capacity,
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(proposal)))
}

/// Commit the chosen tickets as a new sprint.
pub async fn start(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<StartSprintRequest>, ApiError>,
) -> Result<ResponseJson<ApiResponse<SprintWithTickets>>, ApiError> {
    let started = start_sprint(state.pool(), &payload).await?;
    Ok(ResponseJson(ApiResponse::success(started)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sprints", get(list_sprints).post(start))
        .route("/sprints/propose", post(propose))
        .route("/sprints/{sprint_id}", get(get_sprint))
}
