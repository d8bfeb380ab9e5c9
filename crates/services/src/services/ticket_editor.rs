//! Create/edit form for a single ticket.
//!
//! Only required-field checks happen here. After a successful write the full
//! ticket list is re-read so the caller can replace its board state.

use std::str::FromStr;

use db::{
    models::ticket::{CreateTicket, Ticket, TicketPriority, TicketStatus, UpdateTicket},
    validation::{ValidationError, validate_story_points},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use super::store::{StoreError, TicketStore};

/// Raw form fields as entered.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct TicketForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub ticket_type: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub story_points: Option<i64>,
    /// Only read in create mode; blank means backlog.
    #[serde(default)]
    pub status: Option<String>,
}

impl TicketForm {
    /// Pre-fill from an existing ticket for edit mode.
    pub fn from_ticket(ticket: &Ticket) -> Self {
        Self {
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            ticket_type: ticket.ticket_type.clone(),
            priority: ticket.priority.to_string(),
            story_points: ticket.story_points,
            status: Some(ticket.status.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Title is required")]
    MissingTitle,
    #[error("Type is required")]
    MissingType,
    #[error("Priority is required")]
    MissingPriority,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fields that passed the required checks.
struct ValidatedForm {
    title: String,
    description: Option<String>,
    ticket_type: String,
    priority: TicketPriority,
    story_points: Option<i64>,
    status: TicketStatus,
}

impl TicketForm {
    fn validate(&self) -> Result<ValidatedForm, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::MissingTitle);
        }
        let ticket_type = self.ticket_type.trim();
        if ticket_type.is_empty() {
            return Err(FormError::MissingType);
        }
        let priority = self.priority.trim();
        if priority.is_empty() {
            return Err(FormError::MissingPriority);
        }
        let priority = TicketPriority::from_str(priority)
            .map_err(|_| ValidationError::InvalidTicketPriority(priority.to_string()))?;

        validate_story_points(self.story_points)?;

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => TicketStatus::Backlog,
            Some(raw) => TicketStatus::from_str(raw)
                .map_err(|_| ValidationError::InvalidTicketStatus(raw.to_string()))?,
        };

        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(ValidatedForm {
            title: title.to_string(),
            description,
            ticket_type: ticket_type.to_string(),
            priority,
            story_points: self.story_points,
            status,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(Uuid),
}

/// Result of a submit: the written row plus the re-read list.
#[derive(Debug, Clone, Serialize, TS)]
pub struct SubmittedTicket {
    pub ticket: Ticket,
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Clone)]
pub struct TicketEditor {
    mode: EditorMode,
    form: TicketForm,
}

impl TicketEditor {
    pub fn create(form: TicketForm) -> Self {
        Self {
            mode: EditorMode::Create,
            form,
        }
    }

    pub fn edit(ticket_id: Uuid, form: TicketForm) -> Self {
        Self {
            mode: EditorMode::Edit(ticket_id),
            form,
        }
    }

    pub fn for_ticket(ticket: &Ticket) -> Self {
        Self::edit(ticket.id, TicketForm::from_ticket(ticket))
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn form_mut(&mut self) -> &mut TicketForm {
        &mut self.form
    }

    pub async fn submit(self, store: &dyn TicketStore) -> Result<SubmittedTicket, EditorError> {
        let fields = self.form.validate()?;

        let ticket = match self.mode {
            EditorMode::Create => {
                let data = CreateTicket {
                    title: fields.title,
                    description: fields.description,
                    ticket_type: fields.ticket_type,
                    priority: fields.priority,
                    story_points: fields.story_points,
                    status: Some(fields.status),
                };
                store.insert(&data).await?
            }
            EditorMode::Edit(id) => {
                let data = UpdateTicket {
                    title: fields.title,
                    description: fields.description,
                    ticket_type: fields.ticket_type,
                    priority: fields.priority,
                    story_points: fields.story_points,
                    status: None,
                };
                store.update(id, &data).await?
            }
        };

        let tickets = store.list_all().await?;
        Ok(SubmittedTicket { ticket, tickets })
    }
}
