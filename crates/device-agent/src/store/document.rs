//! Device Document I/O
//!
//! Reads and writes the JSON document that backs a sensor store. The
//! document carries device-level fields (activation state, identifiers,
//! location, tokens) next to `sensor_list`; those are passed through as-is.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

/// Field of the device document holding the component records
pub const SENSOR_LIST: &str = "sensor_list";

/// Read a device document.
///
/// A missing file, an unreadable file, malformed JSON or a non-object root
/// all mean "no data yet" and yield `None`.
pub async fn read_document(path: &Path) -> Option<Map<String, Value>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No device document at {}", path.display());
            return None;
        }
        Err(e) => {
            warn!("Failed to read device document {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            warn!("Device document {} is not a JSON object", path.display());
            None
        }
        Err(e) => {
            warn!("Failed to parse device document {}: {}", path.display(), e);
            None
        }
    }
}

/// Write a device document, creating the data directory if needed.
///
/// The content goes to a sibling temporary file first and is renamed into
/// place, so readers never observe a partially written document.
pub async fn write_document(path: &Path, document: &Map<String, Value>) -> StoreResult<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| StoreError::io(dir, e))?;
        }
    }

    let mut content = serde_json::to_string_pretty(document)?;
    content.push('\n');
    let staging = staging_path(path);
    fs::write(&staging, content)
        .await
        .map_err(|e| StoreError::io(&staging, e))?;
    fs::rename(&staging, path)
        .await
        .map_err(|e| StoreError::io(path, e))?;

    debug!("Saved device document: {}", path.display());
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
