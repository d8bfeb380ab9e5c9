//! Ticket generation proxy.
//!
//! Forwards free-text requirements to the n8n ticket-generation workflow and
//! relays its reply. The text may come from client-side PDF extraction and
//! is passed through untouched.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use services::services::{config::GENERATE_TICKETS_URL_VAR, workflow::WorkflowError};

use crate::{AppState, error::ApiError};

pub async fn generate_tickets(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload: Value = serde_json::from_slice(&body).unwrap_or_else(|_| json!({}));

    let spec = payload
        .get("spec")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Spec is required".to_string()))?;

    let url = state
        .settings()
        .generate_tickets_url()
        .ok_or(WorkflowError::NotConfigured(GENERATE_TICKETS_URL_VAR))?;

    let response = state
        .workflow()
        .post_json(&url, &json!({ "spec": spec }))
        .await?;

    if !response.is_success() {
        return Err(ApiError::Upstream {
            status: response.status,
            error: response.error_value(),
        });
    }

    Ok((StatusCode::OK, Json(response.body_or_empty())).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/generate", post(generate_tickets))
}
