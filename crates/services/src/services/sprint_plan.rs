//! Sprint planning: normalizing the planner workflow's reply and committing
//! the chosen tickets as a sprint.
//!
//! The planner is an external workflow whose output shape is not fixed. The
//! decoder accepts, in order:
//!
//! 1. a JSON string holding any of the shapes below (decoded once)
//! 2. `{ "sprint_tickets": [...] }`
//! 3. `{ "tickets": [...] }`
//! 4. a bare `[...]`
//!
//! Anything else is an error; an unrecognized reply never turns into an empty
//! plan.

use std::collections::HashSet;

use db::{
    models::{
        sprint::{Sprint, SprintWithTickets, StartSprintError},
        ticket::TicketStatus,
    },
    validation::{ValidationError, validate_capacity},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use sqlx::SqlitePool;
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use super::{
    config::{PLAN_SPRINT_URL_VAR, WorkflowSettings},
    store::{StoreError, TicketStore},
    workflow::{WorkflowClient, WorkflowError},
};

#[derive(Debug, Error, PartialEq)]
pub enum PlanParseError {
    #[error("Planner returned a string that is not JSON: {0}")]
    InvalidJson(String),
    #[error("Unrecognized sprint plan shape: {0}")]
    UnrecognizedShape(String),
    #[error("Invalid ticket at index {index}: {reason}")]
    InvalidTicket { index: usize, reason: String },
}

/// A ticket as proposed by the planner. It must carry an `id` or a `title`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct PlannedTicket {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub ticket_type: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub story_points: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SprintPlan {
    pub tickets: Vec<PlannedTicket>,
    pub total_points: i64,
}

impl SprintPlan {
    pub fn from_upstream(value: &Value) -> Result<Self, PlanParseError> {
        let decoded;
        let value = match value {
            Value::String(raw) => {
                decoded = serde_json::from_str::<Value>(raw)
                    .map_err(|e| PlanParseError::InvalidJson(e.to_string()))?;
                &decoded
            }
            other => other,
        };

        let (items, wrapper) = match value {
            Value::Object(map) => match (map.get("sprint_tickets"), map.get("tickets")) {
                (Some(Value::Array(items)), _) => (items, Some(map)),
                (_, Some(Value::Array(items))) => (items, Some(map)),
                _ => return Err(PlanParseError::UnrecognizedShape(describe(value))),
            },
            Value::Array(items) => (items, None),
            other => return Err(PlanParseError::UnrecognizedShape(describe(other))),
        };

        let tickets = items
            .iter()
            .enumerate()
            .map(|(index, item)| parse_ticket(index, item))
            .collect::<Result<Vec<_>, _>>()?;

        let total_points = match wrapper.and_then(upstream_total) {
            Some(total) => total,
            None => sum_points(&tickets)?,
        };

        Ok(Self {
            tickets,
            total_points,
        })
    }
}

fn parse_ticket(index: usize, item: &Value) -> Result<PlannedTicket, PlanParseError> {
    if !item.is_object() {
        return Err(PlanParseError::InvalidTicket {
            index,
            reason: format!("expected an object, found {}", describe(item)),
        });
    }
    let ticket: PlannedTicket =
        serde_json::from_value(item.clone()).map_err(|e| PlanParseError::InvalidTicket {
            index,
            reason: e.to_string(),
        })?;
    if ticket.id.is_none() && ticket.title.is_none() {
        return Err(PlanParseError::InvalidTicket {
            index,
            reason: "missing both `id` and `title`".to_string(),
        });
    }
    if let Some(points) = ticket.story_points
        && points < 0
    {
        return Err(PlanParseError::InvalidTicket {
            index,
            reason: format!("negative story points: {points}"),
        });
    }
    Ok(ticket)
}

fn sum_points(tickets: &[PlannedTicket]) -> Result<i64, PlanParseError> {
    tickets
        .iter()
        .enumerate()
        .try_fold(0i64, |total, (index, ticket)| {
            total
                .checked_add(ticket.story_points.unwrap_or(0))
                .ok_or_else(|| PlanParseError::InvalidTicket {
                    index,
                    reason: "story point total overflows".to_string(),
                })
        })
}

fn upstream_total(wrapper: &Map<String, Value>) -> Option<i64> {
    ["total_points", "total_story_points"]
        .iter()
        .find_map(|key| wrapper.get(*key).and_then(Value::as_i64).filter(|n| *n >= 0))
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(_) => "a number".to_string(),
        Value::String(_) => "a string".to_string(),
        Value::Array(_) => "an array".to_string(),
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("an object with keys [{}]", keys.join(", "))
        }
    }
}

/// Planner proposal returned to the sprint page.
#[derive(Debug, Clone, Serialize, TS)]
pub struct ProposedSprint {
    pub capacity: i64,
    pub tickets: Vec<PlannedTicket>,
    pub total_points: i64,
}

#[derive(Debug, Error)]
pub enum ProposeError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error("Planner returned status {status}")]
    Upstream { status: u16, error: Value },
    #[error(transparent)]
    Parse(#[from] PlanParseError),
}

/// Send the current backlog to the planner workflow and normalize its reply.
pub async fn propose_sprint(
    store: &dyn TicketStore,
    client: &WorkflowClient,
    settings: &WorkflowSettings,
    capacity: i64,
) -> Result<ProposedSprint, ProposeError> {
    validate_capacity(capacity)?;
    let url = settings
        .plan_sprint_url()
        .ok_or(WorkflowError::NotConfigured(PLAN_SPRINT_URL_VAR))?;

    let backlog = store.list_by_status(TicketStatus::Backlog).await?;
    let response = client
        .post_json(&url, &json!({ "tickets": backlog, "capacity": capacity }))
        .await?;

    if !response.is_success() {
        return Err(ProposeError::Upstream {
            status: response.status,
            error: response.error_value(),
        });
    }

    let body = response
        .body
        .ok_or_else(|| PlanParseError::UnrecognizedShape("a non-JSON body".to_string()))?;
    let plan = SprintPlan::from_upstream(&body)?;

    tracing::info!(
        backlog = backlog.len(),
        proposed = plan.tickets.len(),
        total_points = plan.total_points,
        capacity,
        "Sprint proposal received"
    );

    Ok(ProposedSprint {
        capacity,
        tickets: plan.tickets,
        total_points: plan.total_points,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct StartSprintRequest {
    pub capacity: i64,
    pub ticket_ids: Vec<Uuid>,
}

#[derive(Debug, Error)]
pub enum CommitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("At least one ticket is required")]
    NoTickets,
    #[error("Duplicate ticket id: {0}")]
    DuplicateTicket(Uuid),
    #[error(transparent)]
    Start(#[from] StartSprintError),
}

impl StartSprintRequest {
    pub fn validate(&self) -> Result<(), CommitError> {
        validate_capacity(self.capacity)?;
        if self.ticket_ids.is_empty() {
            return Err(CommitError::NoTickets);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.ticket_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(CommitError::DuplicateTicket(*dup));
        }
        Ok(())
    }
}

/// Commit the selected tickets as one new sprint.
pub async fn start_sprint(
    pool: &SqlitePool,
    request: &StartSprintRequest,
) -> Result<SprintWithTickets, CommitError> {
    request.validate()?;
    Ok(Sprint::start(pool, request.capacity, &request.ticket_ids).await?)
}
