//! Sprint model.
//!
//! A sprint is created only when a proposed plan is committed. Committing
//! writes one sprint row and moves the selected tickets into it inside a
//! single transaction.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use super::ticket::Ticket;

const SPRINT_COLUMNS: &str = "id, capacity, total_story_points, created_at, updated_at";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, TS)]
pub struct Sprint {
    pub id: Uuid,
    pub capacity: i64,
    pub total_story_points: i64,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateSprint {
    pub capacity: i64,
    pub total_story_points: i64,
}

/// A committed sprint together with the tickets moved into it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SprintWithTickets {
    pub sprint: Sprint,
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Error)]
pub enum StartSprintError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Tickets not found: {}", format_ids(.0))]
    TicketsNotFound(Vec<Uuid>),
    #[error("Total story points of the selected tickets is too large")]
    PointsOverflow,
}

fn format_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Sprint {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Sprint>(&format!(
            "SELECT {SPRINT_COLUMNS} FROM sprints ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Sprint>(&format!("SELECT {SPRINT_COLUMNS} FROM sprints WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        conn: &mut SqliteConnection,
        data: &CreateSprint,
        sprint_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Sprint>(&format!(
            "INSERT INTO sprints (id, capacity, total_story_points, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING {SPRINT_COLUMNS}"
        ))
        .bind(sprint_id)
        .bind(data.capacity)
        .bind(data.total_story_points)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
    }

    /// Commit a sprint: one sprint row whose `total_story_points` is the sum
    /// of the selected tickets' points, then every selected ticket moved to
    /// `in_sprint` with the new sprint id.
    ///
    /// Duplicate ids are collapsed. If any id has no row, nothing is written.
    pub async fn start(
        pool: &SqlitePool,
        capacity: i64,
        ticket_ids: &[Uuid],
    ) -> Result<SprintWithTickets, StartSprintError> {
        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = ticket_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let mut tx = pool.begin().await?;

        let selected = Ticket::find_by_ids(&mut tx, &ids).await?;
        if selected.len() != ids.len() {
            let found: HashSet<Uuid> = selected.iter().map(|t| t.id).collect();
            let missing = ids.into_iter().filter(|id| !found.contains(id)).collect();
            return Err(StartSprintError::TicketsNotFound(missing));
        }

        let total_story_points = selected
            .iter()
            .try_fold(0i64, |total, ticket| total.checked_add(ticket.points()))
            .ok_or(StartSprintError::PointsOverflow)?;
        let sprint = Sprint::create(
            &mut tx,
            &CreateSprint {
                capacity,
                total_story_points,
            },
            Uuid::new_v4(),
        )
        .await?;

        let updated = Ticket::assign_to_sprint(&mut tx, sprint.id, &ids).await?;
        let tickets = Ticket::find_by_ids(&mut tx, &ids).await?;

        tx.commit().await?;

        tracing::info!(
            sprint_id = %sprint.id,
            tickets = updated,
            total_story_points = sprint.total_story_points,
            capacity = sprint.capacity,
            "Started sprint"
        );

        Ok(SprintWithTickets { sprint, tickets })
    }
}
