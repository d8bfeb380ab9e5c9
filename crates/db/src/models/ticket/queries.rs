//! CRUD query operations for tickets.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{CreateTicket, Ticket, TicketStatus, UpdateTicket};

const TICKET_COLUMNS: &str = "id, title, description, type, priority, story_points, status, \
                              sprint_id, created_at, updated_at";

impl Ticket {
    /// All tickets, newest first.
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(pool)
        .await
    }

    /// Tickets in one lane, newest first.
    pub async fn find_by_status(
        pool: &SqlitePool,
        status: TicketStatus,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE status = $1 \
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(status)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(&format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_sprint_id(
        pool: &SqlitePool,
        sprint_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE sprint_id = $1 \
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(sprint_id)
        .fetch_all(pool)
        .await
    }

    /// Tickets matching any of `ids`. Unknown ids are skipped, so callers
    /// compare lengths when every id must exist.
    pub async fn find_by_ids(
        conn: &mut SqliteConnection,
        ids: &[Uuid],
    ) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id IN ("));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY created_at DESC, rowid DESC");

        builder.build_query_as::<Ticket>().fetch_all(&mut *conn).await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateTicket,
        ticket_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        let status = data.status.unwrap_or_default();

        sqlx::query_as::<_, Ticket>(&format!(
            "INSERT INTO tickets (id, title, description, type, priority, story_points, status, \
                                  created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             RETURNING {TICKET_COLUMNS}"
        ))
        .bind(ticket_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.ticket_type)
        .bind(data.priority)
        .bind(data.story_points)
        .bind(status)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Replace the editable fields. Returns `None` when no row has `id`.
    ///
    /// Concurrent writers are last-write-wins; `updated_at` always moves.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateTicket,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(&format!(
            "UPDATE tickets
                SET title = $2,
                    description = $3,
                    type = $4,
                    priority = $5,
                    story_points = $6,
                    status = COALESCE($7, status),
                    updated_at = $8
              WHERE id = $1
             RETURNING {TICKET_COLUMNS}"
        ))
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.ticket_type)
        .bind(data.priority)
        .bind(data.story_points)
        .bind(data.status)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    /// Single-row lane change, as issued by a board drag.
    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: TicketStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>(&format!(
            "UPDATE tickets SET status = $2, updated_at = $3 WHERE id = $1
             RETURNING {TICKET_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    /// Move every ticket in `ids` into `sprint_id` and the In Sprint lane.
    /// Returns the number of rows touched.
    pub async fn assign_to_sprint(
        conn: &mut SqliteConnection,
        sprint_id: Uuid,
        ids: &[Uuid],
    ) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE tickets SET status = ");
        builder.push_bind(TicketStatus::InSprint);
        builder.push(", sprint_id = ");
        builder.push_bind(sprint_id);
        builder.push(", updated_at = ");
        builder.push_bind(Utc::now());
        builder.push(" WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let result = builder.build().execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
