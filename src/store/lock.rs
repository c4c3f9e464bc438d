//! Advisory, TTL-based project lock.
//!
//! The lock is informational: it records who touched a project and whether
//! that activity looks current, for a human or another process to inspect.
//! It is not a mutual-exclusion primitive: acquisition is last-writer-wins
//! with no fencing, and the engine never blocks on it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::naming::ProjectPaths;
use crate::store::{decode_json, write_json};

/// Observable lock states. `Active` transitions to `Stale` lazily, on the
/// first inspection after the TTL elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockState {
    Missing,
    Active,
    Stale,
    Corrupt,
    Released,
    #[serde(other)]
    Unknown,
}

impl Default for LockState {
    fn default() -> Self {
        LockState::Unknown
    }
}

impl std::fmt::Display for LockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LockState::Missing => "missing",
            LockState::Active => "active",
            LockState::Stale => "stale",
            LockState::Corrupt => "corrupt",
            LockState::Released => "released",
            LockState::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// On-disk lock payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LockFile {
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    status: LockState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    released_at: Option<DateTime<Utc>>,
}

/// In-memory view of the lock, as returned by inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct LockRecord {
    pub owner: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub status: LockState,
    pub is_stale: bool,
}

impl LockRecord {
    fn from_payload(payload: &LockFile, ttl: Duration) -> Self {
        let is_stale = match payload.started_at {
            Some(started_at) => Utc::now() - started_at > ttl,
            None => true,
        };
        Self {
            owner: payload.owner.clone(),
            started_at: payload.started_at,
            status: payload.status,
            is_stale,
        }
    }
}

/// Acquire, inspect, and release the lock for one project.
pub struct LockManager {
    path: PathBuf,
}

impl LockManager {
    pub fn for_project(paths: &ProjectPaths) -> Self {
        Self {
            path: paths.lock_path(),
        }
    }

    /// Write a fresh active lock for `owner`, unconditionally replacing any
    /// existing record.
    pub fn acquire(&self, owner: &str) -> anyhow::Result<LockRecord> {
        let payload = LockFile {
            owner: Some(owner.to_string()),
            started_at: Some(Utc::now()),
            status: LockState::Active,
            released_at: None,
        };
        write_json(&self.path, &payload)?;
        debug!("lock acquired by {owner}");
        Ok(LockRecord::from_payload(&payload, Duration::zero()))
    }

    /// Inspect the lock without taking it.
    ///
    /// Missing file reports `Missing`, unparsable reports `Corrupt`. An
    /// `Active` record older than `ttl` is rewritten as `Stale` on the way
    /// out; if the rewrite fails the staleness is still reported in memory.
    pub fn inspect(&self, ttl: Duration) -> LockRecord {
        if !self.path.exists() {
            return LockRecord {
                owner: None,
                started_at: None,
                status: LockState::Missing,
                is_stale: true,
            };
        }

        let mut payload: LockFile = match decode_json(&self.path) {
            Ok(Some(payload)) => payload,
            Ok(None) | Err(_) => {
                return LockRecord {
                    owner: None,
                    started_at: None,
                    status: LockState::Corrupt,
                    is_stale: true,
                };
            }
        };

        let mut record = LockRecord::from_payload(&payload, ttl);
        if record.status == LockState::Active && record.is_stale {
            payload.status = LockState::Stale;
            if let Err(err) = write_json(&self.path, &payload) {
                debug!("failed to persist stale lock status: {err}");
            }
            record.status = LockState::Stale;
        }
        record
    }

    /// Mark the lock released, preserving the original owner and start time.
    /// If the record cannot be rewritten the file is deleted instead; the
    /// failure mode leans toward "unlocked".
    pub fn release(&self) -> anyhow::Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut payload: LockFile = match decode_json(&self.path) {
            Ok(Some(payload)) => payload,
            Ok(None) | Err(_) => LockFile::default(),
        };
        payload.status = LockState::Released;
        payload.released_at = Some(Utc::now());
        if let Err(err) = write_json(&self.path, &payload) {
            warn!("failed to rewrite lock on release, deleting: {err}");
            let _ = fs::remove_file(&self.path);
        }
        Ok(())
    }
}
