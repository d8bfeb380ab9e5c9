//! Validation for ticket and sprint fields.
//!
//! The tables store status and priority as plain text without CHECK
//! constraints, so every value crossing into the store goes through here
//! (or through the typed enums in [`crate::models::ticket`]).

use thiserror::Error;

/// Validation errors for ticket and sprint fields
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error(
        "Invalid ticket status: '{0}'. Valid values: backlog, in_sprint, in_progress, done"
    )]
    InvalidTicketStatus(String),

    #[error("Invalid ticket priority: '{0}'. Valid values: low, medium, high, critical")]
    InvalidTicketPriority(String),

    #[error("Story points must be a non-negative integer, got {0}")]
    NegativeStoryPoints(i64),

    #[error("Capacity must be a positive number")]
    NonPositiveCapacity,
}

/// Valid ticket status values (matches TicketStatus serialization), in lane order
pub const VALID_TICKET_STATUSES: &[&str] = &["backlog", "in_sprint", "in_progress", "done"];

/// Validate a ticket status string
///
/// # Examples
/// ```
/// use db::validation::validate_ticket_status;
///
/// assert!(validate_ticket_status("in_sprint").is_ok());
/// assert!(validate_ticket_status("todo").is_err());
/// ```
pub fn validate_ticket_status(status: &str) -> Result<(), ValidationError> {
    if VALID_TICKET_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(ValidationError::InvalidTicketStatus(status.to_string()))
    }
}

pub fn validate_story_points(points: Option<i64>) -> Result<(), ValidationError> {
    match points {
        Some(p) if p < 0 => Err(ValidationError::NegativeStoryPoints(p)),
        _ => Ok(()),
    }
}

pub fn validate_capacity(capacity: i64) -> Result<(), ValidationError> {
    if capacity > 0 {
        Ok(())
    } else {
        Err(ValidationError::NonPositiveCapacity)
    }
}
