//! Persistence boundary for project metadata.
//!
//! Every document under `.stepgate/` goes through the typed decode in this
//! module. Decode failures surface as `DecodeError`; the per-document stores
//! map them to default values explicitly, because a corrupt or half-written
//! document must degrade to "fresh" rather than wedge the workflow.
//!
//! Writes are full overwrites with stable key ordering (struct field order
//! plus `BTreeMap` for file maps), so saving identical content produces
//! byte-identical files. The hash-based dirty check depends on that.

pub mod index;
pub mod lock;
pub mod session;

pub use index::{FileIndex, FileIndexEntry, IndexStore};
pub use lock::{LockManager, LockRecord, LockState};
pub use session::{HistoryEntry, Session, SessionStore};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::errors::DecodeError;

/// Decode a JSON document at `path`.
///
/// Returns `Ok(None)` when the file does not exist; absence is a normal
/// state, not an error. Read and parse failures return `DecodeError` so the
/// caller can decide whether to default or propagate.
pub fn decode_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, DecodeError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| DecodeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&content).map_err(|source| DecodeError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(value))
}

/// Serialize `value` as pretty JSON and overwrite `path`, creating parent
/// directories as needed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        count: u32,
    }

    #[test]
    fn decode_absent_file_is_none() {
        let dir = tempdir().unwrap();
        let result: Option<Doc> = decode_json(&dir.path().join("missing.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn decode_corrupt_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let result: Result<Option<Doc>, _> = decode_json(&path);
        assert!(matches!(result, Err(DecodeError::Parse { .. })));
    }

    #[test]
    fn write_then_decode_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/doc.json");
        let doc = Doc {
            name: "demo".into(),
            count: 3,
        };
        write_json(&path, &doc).unwrap();
        let loaded: Doc = decode_json(&path).unwrap().unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn repeated_saves_are_byte_identical() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.json");
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), 2u32);
        map.insert("a".to_string(), 1u32);
        write_json(&path, &map).unwrap();
        let first = fs::read(&path).unwrap();
        write_json(&path, &map).unwrap();
        let second = fs::read(&path).unwrap();
        assert_eq!(first, second);
        // Keys come out sorted regardless of insertion order.
        let text = String::from_utf8(first).unwrap();
        assert!(text.find("\"a\"").unwrap() < text.find("\"b\"").unwrap());
    }
}
