use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::{models::sprint::StartSprintError, validation::ValidationError};
use serde_json::{Value, json};
use services::services::{
    board::MoveError,
    sprint_plan::{CommitError, PlanParseError, ProposeError},
    store::StoreError,
    ticket_editor::{EditorError, FormError},
    workflow::WorkflowError,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    /// Non-2xx reply from a workflow, relayed with its status.
    #[error("Upstream returned {status}")]
    Upstream { status: u16, error: Value },
    #[error(transparent)]
    PlanParse(#[from] PlanParseError),
    #[error("{0}")]
    Internal(String),
}

/// Malformed or mistyped request bodies answer with the JSON error envelope.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<FormError> for ApiError {
    fn from(e: FormError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<EditorError> for ApiError {
    fn from(e: EditorError) -> Self {
        match e {
            EditorError::Form(e) => e.into(),
            EditorError::Store(e) => e.into(),
        }
    }
}

impl From<MoveError> for ApiError {
    fn from(e: MoveError) -> Self {
        match e {
            MoveError::UnknownLane(_) => ApiError::BadRequest(e.to_string()),
            MoveError::RolledBack(store) => store.into(),
            MoveError::ReloadFailed { update, .. } => update.into(),
        }
    }
}

impl From<ProposeError> for ApiError {
    fn from(e: ProposeError) -> Self {
        match e {
            ProposeError::Invalid(e) => e.into(),
            ProposeError::Store(e) => e.into(),
            ProposeError::Workflow(e) => e.into(),
            ProposeError::Upstream { status, error } => ApiError::Upstream { status, error },
            ProposeError::Parse(e) => e.into(),
        }
    }
}

impl From<CommitError> for ApiError {
    fn from(e: CommitError) -> Self {
        match e {
            CommitError::Invalid(e) => e.into(),
            CommitError::NoTickets
            | CommitError::DuplicateTicket(_)
            | CommitError::Start(StartSprintError::PointsOverflow) => {
                ApiError::BadRequest(e.to_string())
            }
            CommitError::Start(StartSprintError::TicketsNotFound(_)) => {
                ApiError::NotFound(e.to_string())
            }
            CommitError::Start(StartSprintError::Database(e)) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::Store(StoreError::TicketNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Store(e) => {
                tracing::error!(error = %e, "Ticket store error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Workflow(e) => {
                tracing::error!(error = %e, "Workflow call failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Upstream { status, error } => {
                tracing::error!(status, error = %error, "Workflow returned error status");
                let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
                let body = json!({ "success": false, "error": error });
                return (status, Json(body)).into_response();
            }
            ApiError::PlanParse(e) => {
                tracing::warn!(error = %e, "Unusable sprint plan from workflow");
                StatusCode::BAD_GATEWAY
            }
            ApiError::Internal(message) => {
                tracing::error!(message = %message, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ApiResponse::<()>::error(&self.to_string()))).into_response()
    }
}
