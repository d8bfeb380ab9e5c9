use std::{str::FromStr, time::Duration};

use sqlx::{
    Error, Executor, Pool, Sqlite,
    sqlite::{
        SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePoolOptions,
        SqliteSynchronous,
    },
};
use tracing::info;
use utils::assets::database_path;

pub mod models;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod validation;

// ============================================================================
// Connection Pool Configuration
// ============================================================================

/// Default maximum connections in the pool.
/// SQLite benefits from limited connections due to single-writer model.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Minimum idle connections to maintain.
const DEFAULT_MIN_CONNECTIONS: u32 = 1;

/// Connection acquisition timeout in seconds.
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Idle connection timeout in seconds (10 minutes).
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// Get max connections from environment or use default.
fn get_max_connections() -> u32 {
    std::env::var("MOMENTUM_SQLITE_MAX_CONNECTIONS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|&n| n > 0 && n <= 100)
        .unwrap_or(DEFAULT_MAX_CONNECTIONS)
}

/// Pragmas applied on every new connection via `after_connect`.
///
/// `synchronous` must come after `mmap_size`; mmap'ed writes otherwise
/// bypass fsync guarantees.
async fn apply_performance_pragmas(conn: &mut SqliteConnection) -> Result<(), Error> {
    conn.execute("PRAGMA temp_store = 2").await?;
    conn.execute("PRAGMA mmap_size = 67108864").await?; // 64MB
    conn.execute("PRAGMA synchronous = NORMAL").await?;
    conn.execute("PRAGMA cache_size = -16000").await?;
    Ok(())
}

/// Handle to the ticket/sprint table store.
#[derive(Clone)]
pub struct DBService {
    pub pool: Pool<Sqlite>,
}

impl DBService {
    /// Open (or create) the database at [`database_path`] and apply pending
    /// migrations.
    pub async fn new() -> Result<DBService, Error> {
        let db_path = database_path();
        let database_url = format!("sqlite://{}", db_path.to_string_lossy());
        Self::connect(&database_url).await
    }

    /// Open the database at an explicit sqlx URL and apply pending migrations.
    pub async fn connect(database_url: &str) -> Result<DBService, Error> {
        let max_connections = get_max_connections();

        info!(
            max_connections = max_connections,
            min_connections = DEFAULT_MIN_CONNECTIONS,
            "Initializing SQLite connection pool"
        );

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(DEFAULT_MIN_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(Some(Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS)))
            .after_connect(|conn, _meta| {
                Box::pin(async move { apply_performance_pragmas(conn).await })
            })
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(DBService { pool })
    }

    /// Wrap an existing pool. The caller is responsible for migrations.
    pub fn from_pool(pool: Pool<Sqlite>) -> DBService {
        DBService { pool }
    }

    /// Flush the WAL into the main database file and close the pool.
    pub async fn shutdown(&self) {
        info!("Running final WAL checkpoint...");
        match sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&self.pool)
            .await
        {
            Ok(_) => info!("Final WAL checkpoint completed"),
            Err(e) => tracing::warn!(
                "Final WAL checkpoint failed (data may still be in WAL): {}",
                e
            ),
        }
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}
