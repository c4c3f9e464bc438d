//! Project name normalization and on-disk layout.
//!
//! A free-text project name maps to a canonical snake_case identifier, and
//! the identifier maps to a directory under the configured projects root.
//! Both mappings are deterministic and idempotent.

use std::path::{Path, PathBuf};

use crate::errors::EngineError;

/// Metadata directory name inside each project root.
pub const META_DIR: &str = ".stepgate";
/// Session document path relative to the project root.
pub const SESSION_RELATIVE_PATH: &str = ".stepgate/session.json";
/// File index path relative to the project root.
pub const INDEX_RELATIVE_PATH: &str = ".stepgate/file_index.json";
/// Lock record path relative to the project root.
pub const LOCK_RELATIVE_PATH: &str = ".stepgate/lock.json";

/// Normalize a user-provided project name to a snake_case identifier.
///
/// Lower-cases the trimmed input, replaces every non-alphanumeric character
/// with `_`, collapses runs of `_`, and strips leading/trailing `_`. Fails
/// with `EngineError::InvalidName` when nothing survives.
pub fn normalize_name(name: &str) -> Result<String, EngineError> {
    let mut normalized = String::new();
    let mut last_was_underscore = false;
    for ch in name.trim().to_lowercase().chars() {
        if ch.is_alphanumeric() {
            normalized.push(ch);
            last_was_underscore = false;
        } else if !last_was_underscore {
            normalized.push('_');
            last_was_underscore = true;
        }
    }
    let normalized = normalized.trim_matches('_').to_string();
    if normalized.is_empty() {
        return Err(EngineError::InvalidName);
    }
    Ok(normalized)
}

/// Resolved filesystem layout for one project.
///
/// Constructed once per project from the normalized name and passed by
/// reference into the stores and validators; nothing in the core consults
/// global state for paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    name: String,
    root: PathBuf,
}

impl ProjectPaths {
    /// Build the layout for `normalized_name` under `projects_root`.
    pub fn new(projects_root: &Path, normalized_name: &str) -> Self {
        Self {
            name: normalized_name.to_string(),
            root: projects_root.join(normalized_name),
        }
    }

    /// Normalize `raw_name` and build the layout in one call.
    pub fn resolve(projects_root: &Path, raw_name: &str) -> Result<Self, EngineError> {
        let normalized = normalize_name(raw_name)?;
        Ok(Self::new(projects_root, &normalized))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.exists()
    }

    /// Resolve a path relative to the project root.
    pub fn join(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn session_path(&self) -> PathBuf {
        self.root.join(SESSION_RELATIVE_PATH)
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_RELATIVE_PATH)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_RELATIVE_PATH)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(META_DIR).join("logs")
    }

    /// Ensure the project root and metadata directories exist.
    pub fn ensure_root(&self) -> anyhow::Result<()> {
        use anyhow::Context;
        std::fs::create_dir_all(self.logs_dir())
            .with_context(|| format!("Failed to create project root {}", self.root.display()))?;
        Ok(())
    }
}
