//! Ticket persistence seam.
//!
//! The board and the editor talk to the table store only through
//! [`TicketStore`], so their transition logic can run against SQLite or a
//! fake that fails on demand.

use async_trait::async_trait;
use db::models::ticket::{CreateTicket, Ticket, TicketStatus, UpdateTicket};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Ticket not found: {0}")]
    TicketNotFound(Uuid),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Every ticket, newest first.
    async fn list_all(&self) -> Result<Vec<Ticket>, StoreError>;

    async fn list_by_status(&self, status: TicketStatus) -> Result<Vec<Ticket>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Ticket>, StoreError>;

    async fn insert(&self, data: &CreateTicket) -> Result<Ticket, StoreError>;

    async fn update(&self, id: Uuid, data: &UpdateTicket) -> Result<Ticket, StoreError>;

    async fn update_status(&self, id: Uuid, status: TicketStatus) -> Result<Ticket, StoreError>;

    /// Rows removed; zero when nothing matched.
    async fn delete(&self, id: Uuid) -> Result<u64, StoreError>;
}

/// [`TicketStore`] over the SQLite pool.
#[derive(Clone)]
pub struct SqliteTicketStore {
    pool: SqlitePool,
}

impl SqliteTicketStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TicketStore for SqliteTicketStore {
    async fn list_all(&self) -> Result<Vec<Ticket>, StoreError> {
        Ok(Ticket::find_all(&self.pool).await?)
    }

    async fn list_by_status(&self, status: TicketStatus) -> Result<Vec<Ticket>, StoreError> {
        Ok(Ticket::find_by_status(&self.pool, status).await?)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Ticket>, StoreError> {
        Ok(Ticket::find_by_id(&self.pool, id).await?)
    }

    async fn insert(&self, data: &CreateTicket) -> Result<Ticket, StoreError> {
        let ticket = Ticket::create(&self.pool, data, Uuid::new_v4()).await?;
        tracing::debug!(ticket_id = %ticket.id, status = %ticket.status, "Created ticket");
        Ok(ticket)
    }

    async fn update(&self, id: Uuid, data: &UpdateTicket) -> Result<Ticket, StoreError> {
        Ticket::update(&self.pool, id, data)
            .await?
            .ok_or(StoreError::TicketNotFound(id))
    }

    async fn update_status(&self, id: Uuid, status: TicketStatus) -> Result<Ticket, StoreError> {
        Ticket::update_status(&self.pool, id, status)
            .await?
            .ok_or(StoreError::TicketNotFound(id))
    }

    async fn delete(&self, id: Uuid) -> Result<u64, StoreError> {
        Ok(Ticket::delete(&self.pool, id).await?)
    }
}

#[cfg(test)]
mod tests {
    use db::{
        models::ticket::TicketPriority,
        test_utils::{create_test_pool, seed_ticket},
    };

    use super::*;

    #[tokio::test]
    async fn test_update_status_unknown_ticket_is_not_found() {
        let (pool, _dir) = create_test_pool().await;
        let store = SqliteTicketStore::new(pool);

        let missing = Uuid::new_v4();
        let err = store
            .update_status(missing, TicketStatus::Done)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TicketNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_insert_then_list_by_status() {
        let (pool, _dir) = create_test_pool().await;
        let store = SqliteTicketStore::new(pool);

        let created = store
            .insert(&CreateTicket::backlog("Write docs", "chore", TicketPriority::Low))
            .await
            .unwrap();
        seed_ticket(store.pool(), "busy", TicketStatus::InProgress, Some(2)).await;

        let backlog = store.list_by_status(TicketStatus::Backlog).await.unwrap();
        assert_eq!(backlog.len(), 1);
        assert_eq!(backlog[0].id, created.id);
        assert_eq!(store.list_all().await.unwrap().len(), 2);
    }
}
