use crate::error::{FetchError, Result};
use std::path::Path;
use tracing::warn;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => FetchError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => FetchError::from(e),
        })?;
    }
    Ok(())
}

/// Size of the file at `path` in bytes, or `None` when it cannot be read.
pub fn file_size(path: &Path) -> Option<u64> {
    std::fs::metadata(path).ok().map(|m| m.len())
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Removes `path` if it exists. Failures are logged, never returned.
pub fn remove_file_quietly(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("could not remove {}: {e}", path.display());
        }
    }
}

/// Absolute form of `path` for display; falls back to the input.
pub fn display_path(path: &Path) -> std::path::PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
