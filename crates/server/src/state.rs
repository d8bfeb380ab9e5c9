use std::sync::Arc;

use db::DBService;
use services::services::{
    config::WorkflowSettings,
    store::{SqliteTicketStore, TicketStore},
    workflow::WorkflowClient,
};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub store: Arc<dyn TicketStore>,
    pub workflow: WorkflowClient,
    pub settings: WorkflowSettings,
}

impl AppState {
    pub fn new(db: DBService, settings: WorkflowSettings) -> Self {
        let store = Arc::new(SqliteTicketStore::new(db.pool.clone()));
        Self {
            db,
            store,
            workflow: WorkflowClient::new(),
            settings,
        }
    }

    /// Swap the ticket store, keeping the database for sprint commits.
    pub fn with_store(mut self, store: Arc<dyn TicketStore>) -> Self {
        self.store = store;
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }

    pub fn store(&self) -> &dyn TicketStore {
        self.store.as_ref()
    }

    pub fn workflow(&self) -> &WorkflowClient {
        &self.workflow
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }
}
