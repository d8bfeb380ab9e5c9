//! Kanban board state.
//!
//! Tickets are grouped into four fixed lanes. A drag changes the ticket's lane
//! locally first and then persists it; when the write fails the local copy is
//! thrown away and reloaded from the store.

use std::str::FromStr;

use db::models::ticket::{Ticket, TicketStatus};
use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use super::store::{StoreError, TicketStore};

#[derive(Debug, Clone, Serialize, TS)]
pub struct Lane {
    pub status: TicketStatus,
    pub title: String,
    pub tickets: Vec<Ticket>,
}

/// The four board lanes in display order: Backlog, In Sprint, In Progress, Done.
#[derive(Debug, Clone, Serialize, TS)]
pub struct BoardLanes {
    pub lanes: Vec<Lane>,
}

impl BoardLanes {
    /// Group tickets by status. Each ticket lands in exactly one lane and
    /// keeps its relative input order.
    pub fn partition(tickets: impl IntoIterator<Item = Ticket>) -> Self {
        let mut lanes: Vec<Lane> = TicketStatus::ALL
            .iter()
            .map(|status| Lane {
                status: *status,
                title: status.title().to_string(),
                tickets: Vec::new(),
            })
            .collect();

        for ticket in tickets {
            lanes[lane_index(ticket.status)].tickets.push(ticket);
        }

        Self { lanes }
    }

    pub fn lane(&self, status: TicketStatus) -> &Lane {
        &self.lanes[lane_index(status)]
    }

    pub fn ticket_count(&self) -> usize {
        self.lanes.iter().map(|lane| lane.tickets.len()).sum()
    }
}

fn lane_index(status: TicketStatus) -> usize {
    match status {
        TicketStatus::Backlog => 0,
        TicketStatus::InSprint => 1,
        TicketStatus::InProgress => 2,
        TicketStatus::Done => 3,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// Dropped on its own lane, or the ticket is not on this board.
    Unchanged,
    /// The store accepted the new lane.
    Moved(Ticket),
}

#[derive(Debug, Error)]
pub enum MoveError {
    #[error("Unknown lane: '{0}'")]
    UnknownLane(String),
    /// The write failed and the board was reloaded from the store.
    #[error("Failed to move ticket: {0}")]
    RolledBack(#[source] StoreError),
    /// The write failed and so did the reload; local state still shows the
    /// optimistic lane.
    #[error("Failed to move ticket: {update}; reload also failed: {reload}")]
    ReloadFailed {
        update: StoreError,
        reload: StoreError,
    },
}

/// Board-local copy of the ticket list.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    tickets: Vec<Ticket>,
}

impl BoardState {
    pub fn new(tickets: Vec<Ticket>) -> Self {
        Self { tickets }
    }

    pub async fn load(store: &dyn TicketStore) -> Result<Self, StoreError> {
        Ok(Self::new(store.list_all().await?))
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn lanes(&self) -> BoardLanes {
        BoardLanes::partition(self.tickets.iter().cloned())
    }

    /// Replace local state with the store's current list.
    pub async fn refresh(&mut self, store: &dyn TicketStore) -> Result<(), StoreError> {
        self.tickets = store.list_all().await?;
        Ok(())
    }

    /// Move a ticket using a raw lane id such as `"in_sprint"`.
    pub async fn move_ticket_to_lane(
        &mut self,
        store: &dyn TicketStore,
        ticket_id: Uuid,
        lane_id: &str,
    ) -> Result<MoveOutcome, MoveError> {
        let destination = TicketStatus::from_str(lane_id)
            .map_err(|_| MoveError::UnknownLane(lane_id.to_string()))?;
        self.move_ticket(store, ticket_id, destination).await
    }

    pub async fn move_ticket(
        &mut self,
        store: &dyn TicketStore,
        ticket_id: Uuid,
        destination: TicketStatus,
    ) -> Result<MoveOutcome, MoveError> {
        let Some(index) = self.tickets.iter().position(|t| t.id == ticket_id) else {
            return Ok(MoveOutcome::Unchanged);
        };
        if self.tickets[index].status == destination {
            return Ok(MoveOutcome::Unchanged);
        }

        self.tickets[index].status = destination;

        match store.update_status(ticket_id, destination).await {
            Ok(persisted) => {
                self.tickets[index] = persisted.clone();
                Ok(MoveOutcome::Moved(persisted))
            }
            Err(update) => {
                tracing::warn!(
                    ticket_id = %ticket_id,
                    destination = %destination,
                    error = %update,
                    "Ticket move failed, reloading board"
                );
                match self.refresh(store).await {
                    Ok(()) => Err(MoveError::RolledBack(update)),
                    Err(reload) => {
                        tracing::error!(
                            ticket_id = %ticket_id,
                            update_error = %update,
                            reload_error = %reload,
                            "Board reload failed after ticket move error"
                        );
                        Err(MoveError::ReloadFailed { update, reload })
                    }
                }
            }
        }
    }
}
