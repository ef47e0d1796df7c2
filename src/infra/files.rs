// ============================================================
// Layer 6 — JSON file helpers
// ============================================================
// Shared by every checkpoint component that stores itself as JSON.
// A file that should be part of a checkpoint but is missing is a
// format error (the checkpoint is incomplete), not an I/O error.

use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::Path};

use crate::error::{Result, SummarizerError};

/// Serialise `value` as pretty JSON to `path`
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        SummarizerError::Format(format!("Cannot serialise '{}': {e}", path.display()))
    })?;
    fs::write(path, json).map_err(|e| SummarizerError::io(path, e))?;
    tracing::debug!("Wrote '{}'", path.display());
    Ok(())
}

/// Read and deserialise a JSON checkpoint component
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = read_component(path)?;
    serde_json::from_str(&json).map_err(|e| {
        SummarizerError::Format(format!("Malformed '{}': {e}", path.display()))
    })
}

/// Read a checkpoint component as a string
pub fn read_component(path: &Path) -> Result<String> {
    require_component(path)?;
    fs::read_to_string(path).map_err(|e| SummarizerError::io(path, e))
}

/// Fail with a format error if a checkpoint component is missing
pub fn require_component(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(SummarizerError::Format(format!(
            "Missing checkpoint component '{}'",
            path.display()
        )))
    }
}
