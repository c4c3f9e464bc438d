//! File index: the manifest of every artifact the engine has ever written.
//!
//! Each entry records the content hash, the step that last wrote the file,
//! and the update time. Entries are only added or overwritten; absence of an
//! entry for a required file reads as "unknown", which validation treats as
//! dirty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::warn;

use crate::naming::ProjectPaths;
use crate::store::{decode_json, write_json};

/// Index metadata for one tracked file, keyed by project-relative path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileIndexEntry {
    pub sha1_hash: String,
    pub last_writing_step: String,
    pub updated_at: DateTime<Utc>,
}

/// The whole manifest. `files` is a `BTreeMap` so serialization order is
/// stable across saves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileIndex {
    #[serde(default)]
    pub files: BTreeMap<String, FileIndexEntry>,
    #[serde(default)]
    pub folders: Vec<String>,
}

impl FileIndex {
    /// Upsert the entry for `relative_path` with the current timestamp.
    pub fn record(&mut self, relative_path: &str, sha1_hash: String, step: &str) {
        self.files.insert(
            relative_path.to_string(),
            FileIndexEntry {
                sha1_hash,
                last_writing_step: step.to_string(),
                updated_at: Utc::now(),
            },
        );
    }

    /// The recorded hash for `relative_path`, if any.
    pub fn recorded_hash(&self, relative_path: &str) -> Option<&str> {
        self.files.get(relative_path).map(|e| e.sha1_hash.as_str())
    }
}

/// Loads and saves the file index for one project.
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    pub fn for_project(paths: &ProjectPaths) -> Self {
        Self {
            path: paths.index_path(),
        }
    }

    /// Load the index, degrading to an empty manifest when the file is absent
    /// or corrupt. Same fallback policy as the session store.
    pub fn load(&self) -> FileIndex {
        match decode_json(&self.path) {
            Ok(Some(index)) => index,
            Ok(None) => FileIndex::default(),
            Err(err) => {
                warn!("file index unreadable, using empty manifest: {err}");
                FileIndex::default()
            }
        }
    }

    /// Overwrite the whole manifest.
    pub fn save(&self, index: &FileIndex) -> anyhow::Result<()> {
        write_json(&self.path, index)
    }
}
