//! Runtime configuration for stepgate.
//!
//! Settings load from `stepgate.toml` in the working directory when present,
//! with serde defaults filling anything missing; CLI flags override file
//! values. A missing or partial file is normal; every field has a default.
//!
//! ```toml
//! projects_root = "projects"
//! lock_ttl_minutes = 30
//! lock_owner = "orchestrator"
//! hash_sample_size = 3
//!
//! [rates]
//! input_per_million = 5.0
//! output_per_million = 15.0
//! ```

use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cost::CostRates;

pub const CONFIG_FILE: &str = "stepgate.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepgateConfig {
    /// Directory holding all project roots.
    #[serde(default = "default_projects_root")]
    pub projects_root: PathBuf,
    /// Age beyond which an active lock reads as stale.
    #[serde(default = "default_lock_ttl_minutes")]
    pub lock_ttl_minutes: i64,
    /// Owner recorded when this instance acquires the advisory lock.
    #[serde(default = "default_lock_owner")]
    pub lock_owner: String,
    /// How many indexed files the prefetch probe hashes.
    #[serde(default = "default_hash_sample_size")]
    pub hash_sample_size: usize,
    /// Fixed USD rates for the cost report.
    #[serde(default)]
    pub rates: CostRates,
}

fn default_projects_root() -> PathBuf {
    PathBuf::from("projects")
}

fn default_lock_ttl_minutes() -> i64 {
    30
}

fn default_lock_owner() -> String {
    "orchestrator".to_string()
}

fn default_hash_sample_size() -> usize {
    3
}

impl Default for StepgateConfig {
    fn default() -> Self {
        Self {
            projects_root: default_projects_root(),
            lock_ttl_minutes: default_lock_ttl_minutes(),
            lock_owner: default_lock_owner(),
            hash_sample_size: default_hash_sample_size(),
            rates: CostRates::default(),
        }
    }
}

impl StepgateConfig {
    /// Load from `dir/stepgate.toml`, falling back to defaults when the file
    /// is absent. A present-but-invalid file is an error: unlike project
    /// metadata, the operator's own config should not degrade silently.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            debug!("no {CONFIG_FILE} found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn lock_ttl(&self) -> Duration {
        Duration::minutes(self.lock_ttl_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn absent_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = StepgateConfig::load_from(dir.path()).unwrap();
        assert_eq!(config.projects_root, PathBuf::from("projects"));
        assert_eq!(config.lock_ttl_minutes, 30);
        assert_eq!(config.lock_owner, "orchestrator");
        assert_eq!(config.hash_sample_size, 3);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "lock_ttl_minutes = 5\nlock_owner = \"alice\"\n",
        )
        .unwrap();
        let config = StepgateConfig::load_from(dir.path()).unwrap();
        assert_eq!(config.lock_ttl_minutes, 5);
        assert_eq!(config.lock_owner, "alice");
        assert_eq!(config.hash_sample_size, 3);
        assert!((config.rates.input_per_million - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rates_section_overrides_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[rates]\ninput_per_million = 1.0\noutput_per_million = 2.0\n",
        )
        .unwrap();
        let config = StepgateConfig::load_from(dir.path()).unwrap();
        assert!((config.rates.input_per_million - 1.0).abs() < f64::EPSILON);
        assert!((config.rates.output_per_million - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "lock_ttl_minutes = \"soon\"").unwrap();
        let result = StepgateConfig::load_from(dir.path());
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse config file")
        );
    }

    #[test]
    fn ttl_converts_to_duration() {
        let config = StepgateConfig {
            lock_ttl_minutes: 45,
            ..StepgateConfig::default()
        };
        assert_eq!(config.lock_ttl(), Duration::minutes(45));
    }
}
