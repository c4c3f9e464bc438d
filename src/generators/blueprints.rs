//! Step-2 orchestrator generator: architecture and workplan documents.

use anyhow::Result;

use super::{Generator, record_artifacts, write_if_different};
use crate::naming::ProjectPaths;

const ARCHITECTURE_MD: &str = "\
# System Architecture

## Overview
The system orchestrates gated project workflows across chat-only interactions.

## Components
- **Chat Application** mediates prompts, approvals, and cost accounting.
- **Orchestrator Core** manages project sessions, indexing, and lock handling.
- **UI Designer Agent** maintains tokens, components, and wireframes.
- **Backend/Frontend Scaffold** exposes validated starting points for features.

## Data Flow
1. User submits chat input.
2. Orchestrator probes project state, lock, and index.
3. Dirty agents regenerate artifacts before approval gating.
4. Responses include cost metrics and step prompts.

## Risks
- Lock contention between parallel sessions.
- Token estimation drift when responses vary widely.
- Missing filesystem permissions causing index divergence.
";

const WORKPLAN_MD: &str = "\
# Workplan

## Milestones
1. Handshake & charter creation.
2. Architecture + UI foundations.
3. Scaffold delivery with design token integration.

## Deliverables
- Persistent session + index metadata.
- Architecture/workplan documentation.
- UI tokens, component library, checklists, and wireframes.

## Timeline
- Each step gated by explicit Yes/No approval with validation.
";

pub struct BlueprintWriter;

impl Generator for BlueprintWriter {
    fn generate(&self, paths: &ProjectPaths) -> Result<()> {
        paths.ensure_root()?;
        write_if_different(&paths.join("docs/architecture.md"), ARCHITECTURE_MD)?;
        write_if_different(&paths.join("docs/workplan.md"), WORKPLAN_MD)?;
        record_artifacts(paths, "step_2", &["docs/architecture.md", "docs/workplan.md"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::expected_sections;
    use crate::store::IndexStore;
    use crate::validate::validate_agent;
    use tempfile::tempdir;

    #[test]
    fn both_documents_carry_their_sections() {
        let dir = tempdir().unwrap();
        let paths = ProjectPaths::resolve(dir.path(), "demo").unwrap();
        BlueprintWriter.generate(&paths).unwrap();
        for doc in ["docs/architecture.md", "docs/workplan.md"] {
            let content = std::fs::read_to_string(paths.join(doc)).unwrap();
            for section in expected_sections(doc) {
                assert!(content.contains(section), "{doc} missing {section}");
            }
        }
    }

    #[test]
    fn orchestrator_agent_validates_clean_after_generation() {
        let dir = tempdir().unwrap();
        let paths = ProjectPaths::resolve(dir.path(), "demo").unwrap();
        BlueprintWriter.generate(&paths).unwrap();
        let index = IndexStore::for_project(&paths).load();
        let state = validate_agent(&paths, &index, "step_2", "orchestrator");
        assert!(state.is_clean(), "issues: {:?}", state.issues());
    }
}
