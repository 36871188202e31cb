//! Atomic file output.
//!
//! Every artifact the pipeline produces goes through `write_atomic`: bytes are
//! written to a hidden sibling file and renamed over the target, so a
//! cancelled or crashed run never leaves a half-written file behind.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{MigrateError, Result};

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// Write `bytes` to `path` via a temporary sibling file and a rename.
///
/// Parent directories are created as needed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                MigrateError::io(parent, format!("Failed to create directory: {}", e))
            })?;
        }
    }

    let tmp = temp_path(path);
    fs::write(&tmp, bytes)
        .map_err(|e| MigrateError::io(&tmp, format!("Failed to write: {}", e)))?;

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(MigrateError::io(path, format!("Failed to move into place: {}", e)));
    }
    Ok(())
}

/// Serialize `value` as pretty JSON and write it atomically.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value).map_err(|e| MigrateError::Build {
        message: format!("Failed to serialize {}: {}", path.display(), e),
        help: None,
    })?;
    json.push('\n');
    write_atomic(path, json.as_bytes())
}

/// Copy a file atomically.
pub fn copy_atomic(from: &Path, to: &Path) -> Result<()> {
    let bytes = fs::read(from).map_err(|e| MigrateError::io(from, format!("Failed to read: {}", e)))?;
    write_atomic(to, &bytes)
}
