//! Ticket model for the Kanban board.
//!
//! A ticket is a unit of work with a status (its board lane), a priority and
//! an optional story point estimate. Tickets committed to a sprint carry the
//! sprint's id.

mod queries;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Board lane a ticket sits in.
#[derive(
    Debug,
    Clone,
    Copy,
    Type,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    TS,
    EnumString,
    Display,
    Default,
)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Backlog,
    InSprint,
    InProgress,
    Done,
}

impl TicketStatus {
    /// All lanes in board order.
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Backlog,
        TicketStatus::InSprint,
        TicketStatus::InProgress,
        TicketStatus::Done,
    ];

    /// Column heading shown on the board.
    pub fn title(&self) -> &'static str {
        match self {
            TicketStatus::Backlog => "Backlog",
            TicketStatus::InSprint => "In Sprint",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Done => "Done",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, Hash, TS, EnumString, Display,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl TicketPriority {
    /// Most urgent first.
    pub const ALL: [TicketPriority; 4] = [
        TicketPriority::Critical,
        TicketPriority::High,
        TicketPriority::Medium,
        TicketPriority::Low,
    ];

    /// Short badge label: critical is P0, low is P3.
    pub fn label(&self) -> &'static str {
        match self {
            TicketPriority::Critical => "P0",
            TicketPriority::High => "P1",
            TicketPriority::Medium => "P2",
            TicketPriority::Low => "P3",
        }
    }
}

/// One entry of the editor's priority picker.
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
pub struct PriorityOption {
    pub value: TicketPriority,
    pub label: String,
}

impl PriorityOption {
    pub fn all() -> Vec<PriorityOption> {
        TicketPriority::ALL
            .iter()
            .map(|priority| PriorityOption {
                value: *priority,
                label: priority.label().to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct Ticket {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub ticket_type: String,
    pub priority: TicketPriority,
    pub story_points: Option<i64>,
    pub status: TicketStatus,
    pub sprint_id: Option<Uuid>, // Foreign key to Sprint
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Story points counted toward sprint totals; unestimated tickets count as zero.
    pub fn points(&self) -> i64 {
        self.story_points.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTicket {
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ticket_type: String,
    pub priority: TicketPriority,
    pub story_points: Option<i64>,
    pub status: Option<TicketStatus>,
}

impl CreateTicket {
    pub fn backlog(title: &str, ticket_type: &str, priority: TicketPriority) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            ticket_type: ticket_type.to_string(),
            priority,
            story_points: None,
            status: Some(TicketStatus::Backlog),
        }
    }
}

/// Full replacement of the editable ticket fields.
///
/// `status` is optional; `None` keeps the current lane.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateTicket {
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ticket_type: String,
    pub priority: TicketPriority,
    pub story_points: Option<i64>,
    pub status: Option<TicketStatus>,
}
