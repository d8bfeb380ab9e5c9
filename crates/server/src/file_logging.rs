//! Console and optional file logging.
//!
//! Console output is always on. Setting `MOMENTUM_FILE_LOGGING` to `true` or
//! `1` adds a JSON layer writing daily-rotated files.
//!
//! - `MOMENTUM_LOG_DIR`: log directory, defaults to `{asset_dir}/logs`
//! - `MOMENTUM_LOG_MAX_FILES`: daily files to keep, defaults to 7

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};
use utils::assets::asset_dir;

const LOG_FILE_PREFIX: &str = "momentum.log";
const DEFAULT_MAX_FILES: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct FileLoggingConfig {
    pub enabled: bool,
    pub log_dir: PathBuf,
    pub max_files: usize,
}

impl FileLoggingConfig {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled = lookup("MOMENTUM_FILE_LOGGING")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let log_dir = lookup("MOMENTUM_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| asset_dir().join("logs"));

        let max_files = lookup("MOMENTUM_LOG_MAX_FILES")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_MAX_FILES);

        Self {
            enabled,
            log_dir,
            max_files,
        }
    }
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

/// Filter directive scoping `log_level` to the workspace crates.
fn filter_directive(log_level: &str) -> String {
    format!(
        "warn,server={level},services={level},db={level},utils={level},tower_http={level}",
        level = log_level
    )
}

fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(filter_directive(log_level)).unwrap_or_else(|e| {
        eprintln!("Invalid log level '{log_level}' ({e}), falling back to info");
        EnvFilter::new(filter_directive("info"))
    })
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process. `None` when file logging is off.
pub fn init_logging(log_level: &str) -> Option<WorkerGuard> {
    let config = FileLoggingConfig::default();
    let console_layer = tracing_subscriber::fmt::layer().with_filter(env_filter(log_level));

    if !config.enabled {
        tracing_subscriber::registry().with(console_layer).init();
        return None;
    }

    if let Err(e) = std::fs::create_dir_all(&config.log_dir) {
        eprintln!("Failed to create log directory {:?}: {}", config.log_dir, e);
        tracing_subscriber::registry().with(console_layer).init();
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(env_filter(log_level));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!(
        log_dir = ?config.log_dir,
        max_files = config.max_files,
        "File logging enabled"
    );

    let log_dir = config.log_dir.clone();
    let max_files = config.max_files;
    std::thread::spawn(move || cleanup_old_logs(&log_dir, max_files));

    Some(guard)
}

/// Delete rotated log files beyond the newest `max_files`.
fn cleanup_old_logs(log_dir: &Path, max_files: usize) {
    let Ok(entries) = std::fs::read_dir(log_dir) else {
        return;
    };

    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX))
        })
        .filter_map(|e| {
            let modified = e.metadata().ok()?.modified().ok()?;
            Some((e.path(), modified))
        })
        .collect();

    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in log_files.into_iter().skip(max_files) {
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::debug!(path = ?path, "Removed old log file"),
            Err(e) => tracing::warn!(path = ?path, error = %e, "Failed to remove old log file"),
        }
    }
}
