//! Validation engine: decides whether a step's required artifacts are clean.
//!
//! A required file is clean only when it exists, its current hash matches the
//! recorded index entry, and every declared section marker appears in its
//! text. Each check is independently necessary; any failure to compute one
//! resolves to "not clean": a false dirty is acceptable, a false clean is
//! not.

use std::path::Path;

use crate::catalog::{expected_sections, required_for};
use crate::hash::hash_file;
use crate::naming::{INDEX_RELATIVE_PATH, ProjectPaths};
use crate::store::{FileIndex, IndexStore};

/// Verdict for one required file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileValidationResult {
    pub path: String,
    pub exists: bool,
    pub hash_matches: bool,
    pub sections_valid: bool,
}

impl FileValidationResult {
    pub fn is_clean(&self) -> bool {
        self.exists && self.hash_matches && self.sections_valid
    }
}

/// Aggregate verdict for one agent within a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentValidationState {
    pub agent: String,
    pub required_files: Vec<FileValidationResult>,
}

impl AgentValidationState {
    /// Clean only when every required file passes all three checks.
    pub fn is_clean(&self) -> bool {
        self.required_files.iter().all(|r| r.is_clean())
    }

    /// Short human-readable summaries of what is wrong, one per failing file.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for result in &self.required_files {
            if !result.exists {
                issues.push(format!("{} missing", result.path));
            } else if !result.hash_matches {
                issues.push(format!("{} hash mismatch", result.path));
            } else if !result.sections_valid {
                issues.push(format!("{} sections incomplete", result.path));
            }
        }
        issues
    }
}

fn sections_present(path: &Path, expected: &[&str]) -> bool {
    if expected.is_empty() {
        return true;
    }
    match std::fs::read_to_string(path) {
        Ok(content) => expected.iter().all(|section| content.contains(section)),
        Err(_) => false,
    }
}

/// Validate every required file for `(step, agent)` against the given index.
pub fn validate_agent(
    paths: &ProjectPaths,
    index: &FileIndex,
    step_name: &str,
    agent: &str,
) -> AgentValidationState {
    let required: Vec<&str> = required_for(step_name)
        .into_iter()
        .find(|(name, _)| *name == agent)
        .map(|(_, files)| files)
        .unwrap_or_default();

    let mut results = Vec::with_capacity(required.len());
    for relative_path in required {
        let file_path = paths.join(relative_path);
        let exists = file_path.exists();
        // The index records its own hash, and writing that record changes the
        // file again. An exact match is unattainable there, so the self-entry
        // passes on presence alone.
        let hash_matches = if relative_path == INDEX_RELATIVE_PATH {
            exists && index.recorded_hash(relative_path).is_some()
        } else {
            // Read failures surface as an absent hash, which counts as mismatch.
            let current_hash = if exists { hash_file(&file_path) } else { None };
            match (&current_hash, index.recorded_hash(relative_path)) {
                (Some(current), Some(recorded)) => current == recorded,
                _ => false,
            }
        };
        let sections_valid = sections_present(&file_path, expected_sections(relative_path));
        results.push(FileValidationResult {
            path: relative_path.to_string(),
            exists,
            hash_matches,
            sections_valid,
        });
    }
    AgentValidationState {
        agent: agent.to_string(),
        required_files: results,
    }
}

/// Validate all agents declared for `step_name`, in catalog order.
///
/// Loads the index once and reads only: calling this twice without an
/// intervening write returns identical results.
pub fn validate_step(paths: &ProjectPaths, step_name: &str) -> Vec<AgentValidationState> {
    let index = IndexStore::for_project(paths).load();
    required_for(step_name)
        .into_iter()
        .map(|(agent, _)| validate_agent(paths, &index, step_name, agent))
        .collect()
}
