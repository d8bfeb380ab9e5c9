use std::path::PathBuf;

/// Expand a leading `~` to the current user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    shellexpand::tilde(path).as_ref().into()
}
