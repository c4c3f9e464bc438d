//! Step-1 generator: the solution charter.

use anyhow::Result;

use super::{Generator, record_artifacts, write_if_different};
use crate::naming::ProjectPaths;

const CHARTER_MD: &str = "\
# Solution Charter

## Vision
Deliver a deterministic, step-gated workflow for project-aware artifact generation.

## Goals
- Enforce chat-only interactions with explicit approvals.
- Maintain project persistence under the projects root.
- Provide agent-level validation with Clean/Dirty surfacing.

## Non-Goals
- Building full production deployment scripts.
- Integrating proprietary APIs without explicit configuration.

## Success Metrics
- 100% of required artifacts exist per step.
- Locks flag concurrent mutation for active sessions.
- The header always reflects project + step context.
";

pub struct CharterWriter;

impl Generator for CharterWriter {
    fn generate(&self, paths: &ProjectPaths) -> Result<()> {
        paths.ensure_root()?;
        write_if_different(&paths.join("docs/charter.md"), CHARTER_MD)?;
        record_artifacts(paths, "step_1", &["docs/charter.md"])
    }
}
