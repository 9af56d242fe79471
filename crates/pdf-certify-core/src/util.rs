//! Utility functions shared across the crate.

use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::error::Result;

/// Get the user's config directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

/// Write a sidecar text file, replacing any previous contents.
pub fn write_text_file(path: &Path, text: &str) -> Result<()> {
    debug!("Saving {} bytes of text to {}", text.len(), path.display());
    std::fs::write(path, text).map_err(|e| {
        error!("Failed to write {}: {}", path.display(), e);
        e.into()
    })
}
