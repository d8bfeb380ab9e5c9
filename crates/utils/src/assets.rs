use directories::ProjectDirs;

use crate::path::expand_tilde;

const PROJECT_ROOT: &str = env!("CARGO_MANIFEST_DIR");

/// Directory holding the database and log files.
///
/// Debug builds keep everything under `dev_assets/` in the workspace;
/// release builds use the platform data directory.
pub fn asset_dir() -> std::path::PathBuf {
    let path = if cfg!(debug_assertions) {
        std::path::PathBuf::from(PROJECT_ROOT).join("../../dev_assets")
    } else {
        ProjectDirs::from("ai", "momentum", "momentum")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| std::path::PathBuf::from(".momentum"))
    };

    if !path.exists()
        && let Err(e) = std::fs::create_dir_all(&path)
    {
        tracing::warn!(path = %path.display(), error = %e, "Failed to create asset directory");
    }

    path
}

/// Get the database file path.
///
/// Respects the `MOMENTUM_DATABASE_PATH` environment variable for custom
/// locations, with tilde expansion.
///
/// Default: `{asset_dir}/momentum.sqlite`
pub fn database_path() -> std::path::PathBuf {
    if let Ok(path) = std::env::var("MOMENTUM_DATABASE_PATH") {
        return expand_tilde(&path);
    }
    asset_dir().join("momentum.sqlite")
}
