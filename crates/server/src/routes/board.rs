use axum::{
    Json, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use services::services::board::{BoardLanes, BoardState, MoveOutcome};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// A drag from one lane to another; `lane` is a raw lane id such as `"done"`.
#[derive(Debug, Deserialize, TS)]
pub struct MoveTicketRequest {
    pub ticket_id: Uuid,
    pub lane: String,
}

/// All tickets grouped into the four board lanes.
pub async fn get_board(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<BoardLanes>>, ApiError> {
    let board = BoardState::load(state.store()).await?;
    Ok(ResponseJson(ApiResponse::success(board.lanes())))
}

/// Drop a ticket on a lane and answer with the board as it now stands.
pub async fn move_ticket(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<MoveTicketRequest>, ApiError>,
) -> Result<ResponseJson<ApiResponse<BoardLanes>>, ApiError> {
    let mut board = BoardState::load(state.store()).await?;
    if !board.tickets().iter().any(|t| t.id == payload.ticket_id) {
        return Err(ApiError::NotFound(format!(
            "Ticket not found: {}",
            payload.ticket_id
        )));
    }

    let outcome = board
        .move_ticket_to_lane(state.store(), payload.ticket_id, &payload.lane)
        .await?;
    if let MoveOutcome::Moved(ticket) = &outcome {
        tracing::debug!(ticket_id = %ticket.id, status = %ticket.status, "Ticket dragged");
    }

    Ok(ResponseJson(ApiResponse::success(board.lanes())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/board", get(get_board))
        .route("/board/move", post(move_ticket))
}
