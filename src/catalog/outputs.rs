//! Required-output declarations per `(step, agent)` and the structural
//! section markers validation expects inside specific artifacts.
//!
//! This table is a boundary contract with the generators: both sides must
//! change together.

/// Required output paths for `step_name`, grouped by agent in declared order.
///
/// Steps without declared outputs (the iteration stubs) return an empty list,
/// which validation reads as trivially clean.
pub fn required_for(step_name: &str) -> Vec<(&'static str, Vec<&'static str>)> {
    match step_name {
        "step_0" => vec![(
            "orchestrator",
            vec![".stepgate/session.json", ".stepgate/file_index.json"],
        )],
        "step_1" => vec![("orchestrator", vec!["docs/charter.md"])],
        "step_2" => vec![
            (
                "orchestrator",
                vec!["docs/architecture.md", "docs/workplan.md"],
            ),
            (
                "ui_designer",
                vec![
                    "ui/design_tokens.json",
                    "ui/component_library.md",
                    "ui/wireframes/main.md",
                    "ui/checklists/accessibility.md",
                    "ui/checklists/responsiveness.md",
                ],
            ),
        ],
        "step_3" => vec![(
            "orchestrator",
            vec![
                "src/backend/main.py",
                "src/frontend/src/main.tsx",
                "src/frontend/src/design-system/tokens.ts",
                "src/frontend/src/design-system/BaseButton.tsx",
                "README.md",
                ".env.example",
                ".github/workflows/ci.yml",
            ],
        )],
        _ => Vec::new(),
    }
}

/// Structural section markers that must appear in the named artifact.
/// Paths without declared markers trivially pass the section check.
pub fn expected_sections(relative_path: &str) -> &'static [&'static str] {
    match relative_path {
        "docs/charter.md" => &["## Vision", "## Goals", "## Non-Goals", "## Success Metrics"],
        "docs/architecture.md" => &["## Overview", "## Components", "## Data Flow", "## Risks"],
        "docs/workplan.md" => &["## Milestones", "## Deliverables", "## Timeline"],
        "ui/component_library.md" => &["## Component Inventory", "## Usage Guidelines"],
        "ui/checklists/accessibility.md" => &["# Accessibility Checklist"],
        "ui/checklists/responsiveness.md" => &["# Responsiveness Checklist"],
        _ => &[],
    }
}
