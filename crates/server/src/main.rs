use db::DBService;
use server::{AppState, file_logging, routes};
use services::services::config::{WorkflowSettings, WorkflowUrls};
use sqlx::Error as SqlxError;
use strip_ansi_escapes::strip;
use thiserror::Error;
use utils::assets::{asset_dir, database_path};

#[derive(Debug, Error)]
pub enum MomentumError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sqlx(#[from] SqlxError),
}

#[tokio::main]
async fn main() -> Result<(), MomentumError> {
    dotenvy::dotenv().ok();

    // The guard flushes file logs on drop
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _file_log_guard = file_logging::init_logging(&log_level);

    std::fs::create_dir_all(asset_dir())?;

    tracing::info!(path = %database_path().display(), "Opening database");
    let db = DBService::new().await?;

    let urls = WorkflowUrls::from_env();
    if urls.generate_tickets.is_none() {
        tracing::warn!("N8N_GENERATE_TICKETS_URL is not set; /api/generate will fail");
    }
    if urls.plan_sprint.is_none() {
        tracing::warn!("N8N_PLAN_SPRINT_URL is not set; sprint planning will fail");
    }

    let state = AppState::new(db.clone(), WorkflowSettings::FromEnv);
    let app_router = routes::router(state);

    let port = parse_port(
        std::env::var("BACKEND_PORT")
            .or_else(|_| std::env::var("PORT"))
            .ok(),
    )
    .unwrap_or_else(|| {
        tracing::info!("No PORT environment variable set, using port 0 for auto-assignment");
        0
    });

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    let actual_port = listener.local_addr()?.port();

    tracing::info!("Server running on http://{host}:{actual_port}");

    axum::serve(listener, app_router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.shutdown().await;

    Ok(())
}

/// Port from an env value that may carry ANSI color codes.
fn parse_port(raw: Option<String>) -> Option<u16> {
    let raw = raw?;
    let cleaned = String::from_utf8(strip(raw.as_bytes())).ok()?;
    cleaned.trim().parse::<u16>().ok()
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let terminate = async {
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
            } else {
                tracing::error!("Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
    }
}
