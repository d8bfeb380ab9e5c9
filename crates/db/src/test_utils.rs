//! Test utilities for database tests.
//!
//! Pools are copied from a template database that already has the
//! ticket/sprint migrations applied, so each test gets an isolated file
//! without paying for migrations every time.

use std::{path::PathBuf, str::FromStr, sync::OnceLock, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tempfile::TempDir;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::models::ticket::{CreateTicket, Ticket, TicketPriority, TicketStatus};

static TEMPLATE_DIR: OnceLock<TempDir> = OnceLock::new();
static TEMPLATE_DB: OnceCell<PathBuf> = OnceCell::const_new();

fn options_for(path: &std::path::Path) -> SqliteConnectOptions {
    SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))
        .expect("Invalid test database URL")
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
}

async fn template_db() -> &'static PathBuf {
    TEMPLATE_DB
        .get_or_init(|| async {
            let dir = TEMPLATE_DIR
                .get_or_init(|| TempDir::new().expect("Failed to create template temp dir"));
            let path = dir.path().join("template.db");

            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options_for(&path))
                .await
                .expect("Failed to create template pool");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run migrations on template");
            // Closing checkpoints the WAL so a plain file copy is complete
            pool.close().await;

            path
        })
        .await
}

/// Create a migrated test pool.
///
/// Returns the pool and the TempDir backing it; keep the TempDir alive for
/// the duration of the test.
pub async fn create_test_pool() -> (SqlitePool, TempDir) {
    let template = template_db().await;

    let temp_dir = TempDir::new().expect("Failed to create test temp dir");
    let db_path = temp_dir.path().join("test.db");
    std::fs::copy(template, &db_path).expect("Failed to copy template database");

    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options_for(&db_path))
        .await
        .expect("Failed to create test pool");

    (pool, temp_dir)
}

/// Insert a ticket with the given lane and points.
pub async fn seed_ticket(
    pool: &SqlitePool,
    title: &str,
    status: TicketStatus,
    story_points: Option<i64>,
) -> Ticket {
    let data = CreateTicket {
        title: title.to_string(),
        description: None,
        ticket_type: "feature".to_string(),
        priority: TicketPriority::Medium,
        story_points,
        status: Some(status),
    };
    Ticket::create(pool, &data, Uuid::new_v4())
        .await
        .expect("Failed to seed ticket")
}
