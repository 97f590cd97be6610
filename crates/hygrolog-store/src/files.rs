//! JSON array file helpers.
//!
//! Both data files are flat JSON arrays written by full re-encode and
//! overwrite. The encoder output is stable, so writing the same collection
//! twice produces byte-identical files.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::Result;

/// Load a JSON array file, treating a missing or corrupt file as empty.
pub(crate) fn load_or_empty<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!("Failed to read {}: {}, starting empty", path.display(), e);
            return Vec::new();
        }
    };

    match serde_json::from_str(&content) {
        Ok(items) => items,
        Err(e) => {
            warn!("Corrupt data in {}: {}, starting empty", path.display(), e);
            Vec::new()
        }
    }
}

/// Write a collection back as a pretty-printed JSON array.
pub(crate) fn save<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let json = serde_json::to_string_pretty(items)?;
    fs::write(path, json)?;
    Ok(())
}
