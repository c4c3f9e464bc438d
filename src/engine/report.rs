//! The structured turn-response contract.
//!
//! The engine emits a `TurnReport`; rendering it to any particular text
//! layout is a presentation concern handled in `crate::render`. Consumers
//! that want structure (tests, alternative frontends) read the fields
//! directly.

use serde::{Deserialize, Serialize};

use crate::cost::CostReport;

/// PASS/FAIL verdict for one check line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// One per-file or per-condition check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckLine {
    pub label: String,
    pub verdict: Verdict,
}

impl CheckLine {
    pub fn pass(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            verdict: Verdict::Pass,
        }
    }

    pub fn fail(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            verdict: Verdict::Fail,
        }
    }
}

/// One artifact path with a short note (purpose, hash preview, existence).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactNote {
    pub path: String,
    pub note: String,
}

/// Header summarizing project, step, and per-agent clean/dirty state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepHeader {
    pub project: String,
    pub step_name: String,
    pub step_title: String,
    /// One "AGENT: CLEAN" / "AGENT: DIRTY" (or pending) line per agent.
    pub agent_summary: Vec<String>,
}

/// Everything one turn communicates back, before text layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    pub status: Vec<String>,
    pub header: StepHeader,
    pub artifacts: Vec<ArtifactNote>,
    pub diffs: Vec<String>,
    pub checks: Vec<CheckLine>,
    /// Filled during finalization; `None` only mid-construction.
    pub cost: Option<CostReport>,
    /// The pending yes/no (or free-text) question for the operator.
    pub prompt: String,
}
