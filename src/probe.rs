//! Probes run when a project name arrives. Read-only, except that lock
//! inspection may rewrite a lock it finds stale.
//!
//! The three probes (existing-project summary, index hash sample, lock
//! inspection) share no mutable state, so the engine runs them concurrently
//! and joins them before branching. No ordering between them is guaranteed or
//! needed.

use chrono::{DateTime, Duration, Utc};

use crate::hash::hash_file;
use crate::naming::ProjectPaths;
use crate::store::{IndexStore, LockManager, LockRecord, SessionStore};

/// High-level summary of a possibly-existing project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectProbe {
    pub exists: bool,
    pub last_step: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub file_count: usize,
}

/// A small sample of tracked files with their current (not recorded) hashes.
/// `None` hash means the file is missing or unreadable right now.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HashSample {
    pub entries: Vec<(String, Option<String>)>,
}

impl HashSample {
    /// One-line preview used in status output.
    pub fn preview(&self) -> String {
        if self.entries.is_empty() {
            return "no tracked files yet".to_string();
        }
        self.entries
            .iter()
            .map(|(path, hash)| format!("{path} ({})", hash.as_deref().unwrap_or("missing")))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Summarize the session and index of an existing project, if any.
pub async fn probe_existing_project(paths: &ProjectPaths) -> ProjectProbe {
    if !paths.exists() {
        return ProjectProbe {
            exists: false,
            last_step: None,
            last_updated: None,
            file_count: 0,
        };
    }
    let session = SessionStore::for_project(paths).load();
    let index = IndexStore::for_project(paths).load();
    ProjectProbe {
        exists: true,
        last_step: Some(session.current_step),
        last_updated: session.last_updated,
        file_count: index.files.len(),
    }
}

/// Hash the first `sample_size` indexed files to give the operator a quick
/// drift signal before any decision is made.
pub async fn prefetch_hash_sample(paths: &ProjectPaths, sample_size: usize) -> HashSample {
    let index = IndexStore::for_project(paths).load();
    let entries = index
        .files
        .keys()
        .take(sample_size)
        .map(|relative| {
            let hash = hash_file(&paths.join(relative));
            (relative.clone(), hash)
        })
        .collect();
    HashSample { entries }
}

/// Inspect the advisory lock with the configured TTL.
pub async fn inspect_lock(paths: &ProjectPaths, ttl: Duration) -> LockRecord {
    LockManager::for_project(paths).inspect(ttl)
}
