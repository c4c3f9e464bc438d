//! Step-0 bootstrap: project directories, fresh session, seeded index.
//!
//! The index tracks the session file and itself. Writing the index changes
//! its own hash, so after the first save the file is re-hashed and the entry
//! corrected exactly once more. A bounded approximation, not a fixed-point
//! iteration.

use anyhow::{Context, Result};
use chrono::Utc;

use super::Generator;
use crate::catalog;
use crate::hash::hash_file;
use crate::naming::{INDEX_RELATIVE_PATH, ProjectPaths, SESSION_RELATIVE_PATH};
use crate::store::{FileIndex, IndexStore, SessionStore};

/// Directories seeded under every new project root.
pub const PROJECT_FOLDERS: &[&str] = &[
    "docs",
    "src",
    "src/backend",
    "src/frontend",
    "src/frontend/src",
    "src/frontend/src/design-system",
    "src/frontend/public",
    "tests",
    "ui",
    "ui/wireframes",
    "ui/checklists",
    ".github",
    ".github/workflows",
];

pub struct Bootstrap;

impl Generator for Bootstrap {
    fn generate(&self, paths: &ProjectPaths) -> Result<()> {
        paths.ensure_root()?;
        for folder in PROJECT_FOLDERS {
            std::fs::create_dir_all(paths.join(folder))
                .with_context(|| format!("Failed to create project folder {folder}"))?;
        }

        let session_store = SessionStore::for_project(paths);
        let mut session = session_store.load();
        session.project_name = paths.name().to_string();
        session.current_step = catalog::first_step_name();
        session.last_updated = Some(Utc::now());
        session_store.save(&session)?;

        let index_store = IndexStore::for_project(paths);
        let mut index = FileIndex {
            folders: PROJECT_FOLDERS
                .iter()
                .filter(|f| !f.starts_with(".github"))
                .map(|f| f.to_string())
                .collect(),
            ..FileIndex::default()
        };

        let session_hash = hash_file(&paths.session_path())
            .context("Failed to hash freshly written session file")?;
        index.record(SESSION_RELATIVE_PATH, session_hash, "step_0");
        index_store.save(&index)?;

        // Self-referential entry: hash the index file, record that hash into
        // the index, rewrite. The rewrite changes the file again, so re-hash
        // and correct one more time at most.
        let index_hash =
            hash_file(&paths.index_path()).context("Failed to hash freshly written index file")?;
        index.record(INDEX_RELATIVE_PATH, index_hash.clone(), "step_0");
        index_store.save(&index)?;

        let final_hash =
            hash_file(&paths.index_path()).context("Failed to re-hash index file")?;
        if final_hash != index_hash {
            index.record(INDEX_RELATIVE_PATH, final_hash, "step_0");
            index_store.save(&index)?;
        }
        Ok(())
    }
}
