//! Per-project session document: current step, approval history, timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::catalog;
use crate::naming::ProjectPaths;
use crate::store::{decode_json, write_json};

/// One gate approval recorded in the session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub step: String,
    pub approved_at: DateTime<Utc>,
}

/// The session document, overwritten in place on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub project_name: String,
    #[serde(default = "catalog::first_step_name")]
    pub current_step: String,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            project_name: String::new(),
            current_step: catalog::first_step_name(),
            last_updated: None,
            history: Vec::new(),
        }
    }
}

impl Session {
    /// Record a gate approval for `step` and bump the update timestamp.
    pub fn record_approval(&mut self, step: &str) {
        let now = Utc::now();
        self.history.push(HistoryEntry {
            step: step.to_string(),
            approved_at: now,
        });
        self.last_updated = Some(now);
    }
}

/// Loads and saves the session document for one project.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn for_project(paths: &ProjectPaths) -> Self {
        Self {
            path: paths.session_path(),
        }
    }

    /// Load the session, degrading to the default document when the file is
    /// absent or corrupt. Corruption never propagates: the workflow must stay
    /// resumable after a partial write or a manual edit.
    pub fn load(&self) -> Session {
        match decode_json(&self.path) {
            Ok(Some(session)) => session,
            Ok(None) => Session::default(),
            Err(err) => {
                warn!("session unreadable, using default: {err}");
                Session::default()
            }
        }
    }

    /// Overwrite the session document.
    pub fn save(&self, session: &Session) -> anyhow::Result<()> {
        write_json(&self.path, session)
    }
}
