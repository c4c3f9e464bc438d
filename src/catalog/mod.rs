//! The static step catalog: a directed chain of step definitions.
//!
//! Steps form a simple linked sequence via `next_step`; the terminal step has
//! no successor, which is a valid final state rather than an error. The
//! catalog is immutable; `get_step` failing on a name outside the fixed set
//! indicates a programming error, not a user mistake.

pub mod outputs;

pub use outputs::{expected_sections, required_for};

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// One step in the workflow chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Stable identifier (e.g., "step_1")
    pub name: String,
    /// Human-readable title shown in headers
    pub title: String,
    /// What the step accomplishes
    pub description: String,
    /// Approval question; may contain a `{name}` placeholder for the
    /// project's display name
    pub gate_prompt: String,
    /// Successor step name, `None` for the terminal step
    pub next_step: Option<String>,
}

impl StepDefinition {
    fn new(
        name: &str,
        title: &str,
        description: &str,
        gate_prompt: &str,
        next_step: Option<&str>,
    ) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            gate_prompt: gate_prompt.to_string(),
            next_step: next_step.map(|s| s.to_string()),
        }
    }

    /// The gate prompt with the `{name}` placeholder filled in.
    pub fn gate_prompt_for(&self, display_name: &str) -> String {
        self.gate_prompt.replace("{name}", display_name)
    }

    /// Required output paths per agent, in declared agent order.
    pub fn required_outputs(&self) -> Vec<(&'static str, Vec<&'static str>)> {
        required_for(&self.name)
    }
}

/// The full step chain, in declared order.
pub fn step_sequence() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new(
            "step_0",
            "Project Handshake",
            "Capture initial project metadata and ensure persistence folders exist.",
            "Proceed to Step 1 (Discovery & Intent) with project '{name}'?",
            Some("step_1"),
        ),
        StepDefinition::new(
            "step_1",
            "Discovery & Intent",
            "Draft the solution charter capturing vision, goals, non-goals, and metrics.",
            "Approve the Solution Charter and proceed to Step 2 (Architecture & UI Foundations)?",
            Some("step_2"),
        ),
        StepDefinition::new(
            "step_2",
            "Architecture & UI Foundations",
            "Outline architecture, workplan, and establish UI design artifacts.",
            "Approve the architecture and UI foundations to proceed to Step 3 (Scaffold)?",
            Some("step_3"),
        ),
        StepDefinition::new(
            "step_3",
            "Scaffold",
            "Provide backend/frontend scaffolding, design-system primitives, and CI plumbing.",
            "Scaffold validated. Proceed to Step 4 (Feature Iteration 1)?",
            Some("step_4"),
        ),
        StepDefinition::new(
            "step_4",
            "Feature Iteration 1",
            "Stub for future feature delivery iterations.",
            "Continue to Step 5 (Feature Iteration 2)?",
            Some("step_5"),
        ),
        StepDefinition::new(
            "step_5",
            "Feature Iteration 2",
            "Stub for continued feature iteration.",
            "Continue to Step 6 (Integration & E2E)?",
            Some("step_6"),
        ),
        StepDefinition::new(
            "step_6",
            "Integration & E2E",
            "Stub for integration and end-to-end validation.",
            "Continue to Step 7 (Release Prep)?",
            Some("step_7"),
        ),
        StepDefinition::new(
            "step_7",
            "Release Prep",
            "Stub for release preparation and summary.",
            "Mark project as ready for release?",
            None,
        ),
    ]
}

/// The first step of the chain.
pub fn first_step() -> StepDefinition {
    step_sequence().remove(0)
}

/// Name of the first step; used as the session default.
pub fn first_step_name() -> String {
    "step_0".to_string()
}

/// Look up a step by name.
pub fn get_step(name: &str) -> Result<StepDefinition, EngineError> {
    step_sequence()
        .into_iter()
        .find(|step| step.name == name)
        .ok_or_else(|| EngineError::UnknownStep(name.to_string()))
}

/// Follow the `next_step` pointer. `Ok(None)` marks the terminal step.
pub fn next_step(name: &str) -> Result<Option<StepDefinition>, EngineError> {
    let step = get_step(name)?;
    match step.next_step {
        Some(successor) => Ok(Some(get_step(&successor)?)),
        None => Ok(None),
    }
}
