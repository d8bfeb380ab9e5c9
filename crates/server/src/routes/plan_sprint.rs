//! Sprint-planning proxy.
//!
//! Relays `{ tickets, capacity }` to the n8n planning workflow and returns the
//! workflow's status and JSON as-is. Configuration and upstream failures are
//! logged in full but reported to the client only as a generic 500.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use services::services::config::PLAN_SPRINT_URL_VAR;

use crate::{AppState, error::ApiError};

const INTERNAL_SERVER_ERROR: &str = "Internal server error";

fn internal() -> ApiError {
    ApiError::Internal(INTERNAL_SERVER_ERROR.to_string())
}

pub async fn plan_sprint(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::error!(error = %e, "plan-sprint request body is not JSON");
        internal()
    })?;

    let tickets = payload
        .get("tickets")
        .filter(|t| t.is_array())
        .ok_or_else(|| ApiError::BadRequest("Tickets must be an array".to_string()))?;

    let capacity = payload
        .get("capacity")
        .filter(|c| c.as_f64().is_some_and(|n| n > 0.0))
        .ok_or_else(|| ApiError::BadRequest("Capacity must be a positive number".to_string()))?;

    let Some(url) = state.settings().plan_sprint_url() else {
        tracing::error!("{} is not set", PLAN_SPRINT_URL_VAR);
        return Err(internal());
    };

    let response = state
        .workflow()
        .post_json(&url, &json!({ "tickets": tickets, "capacity": capacity }))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, url = %url, "plan-sprint workflow call failed");
            internal()
        })?;

    let Some(data) = response.body else {
        tracing::error!(
            status = response.status,
            url = %url,
            "plan-sprint workflow returned a non-JSON body"
        );
        return Err(internal());
    };

    let status = StatusCode::from_u16(response.status).map_err(|_| internal())?;
    Ok((status, Json(data)).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/ai/plan-sprint", post(plan_sprint))
}
