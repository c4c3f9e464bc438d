//! Step-3 generator: backend/frontend scaffold, README appendix, env
//! template, and CI workflow.
//!
//! README handling differs from the other artifacts: user content is
//! preserved and the orchestrator appendix is appended only when absent.

use anyhow::Result;
use std::fs;

use super::{Generator, record_artifacts, write_if_different};
use crate::naming::ProjectPaths;

/// Paths this generator owns, relative to the project root.
pub const SCAFFOLD_ARTIFACTS: &[&str] = &[
    "src/backend/main.py",
    "src/frontend/src/main.tsx",
    "src/frontend/src/design-system/tokens.ts",
    "src/frontend/src/design-system/BaseButton.tsx",
    "README.md",
    ".env.example",
    ".github/workflows/ci.yml",
];

const BACKEND_MAIN: &str = "\
from fastapi import FastAPI

app = FastAPI(title=\"Stepgate Project API\")


@app.get(\"/health\")
def health() -> dict[str, str]:
    \"\"\"Simple readiness probe for deployment automation.\"\"\"
    return {\"status\": \"ok\"}
";

const FRONTEND_MAIN: &str = "\
import React from 'react';
import ReactDOM from 'react-dom/client';
import { BaseButton } from './design-system/BaseButton';
import { tokens } from './design-system/tokens';

const App: React.FC = () => (
  <div style={{ fontFamily: tokens.typography.font_family, padding: tokens.spacing.lg }}>
    <h1>Project Workspace</h1>
    <BaseButton intent=\"primary\">Approve</BaseButton>
    <BaseButton intent=\"secondary\">Decline</BaseButton>
  </div>
);

const root = document.getElementById('root');

if (root) {
  ReactDOM.createRoot(root).render(<App />);
}
";

const TOKENS_TS: &str = "\
import designTokens from '../../../../ui/design_tokens.json';

export type DesignTokens = typeof designTokens;

export const tokens: DesignTokens = designTokens;
";

const BASE_BUTTON_TSX: &str = "\
import React from 'react';
import { tokens } from './tokens';

type Intent = 'primary' | 'secondary' | 'danger';

export interface BaseButtonProps extends React.ButtonHTMLAttributes<HTMLButtonElement> {
  intent?: Intent;
}

export const BaseButton: React.FC<BaseButtonProps> = ({ intent = 'primary', children, ...rest }) => (
  <button
    {...rest}
    data-intent={intent}
    style={{
      borderRadius: tokens.radius.md,
      padding: `${tokens.spacing.sm} ${tokens.spacing.lg}`,
      fontFamily: tokens.typography.font_family,
    }}
  >
    {children}
  </button>
);
";

const README_APPENDIX: &str = "
## Orchestrator Mode

This project is managed by a chat-only orchestrator with gated steps. Each
step's artifacts are validated against the tracked file index before any
approval gate opens.
";

const ENV_EXAMPLE: &str = "\
# Environment configuration for the generated project
PROJECT_NAME=your_project_name_here
API_KEY=your_api_key_here
";

const CI_WORKFLOW: &str = "\
name: CI

on: [push, pull_request]

jobs:
  lint:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v3
      - name: Set up Python
        uses: actions/setup-python@v4
        with:
          python-version: '3.11'
      - name: Install dependencies
        run: pip install -r requirements.txt
      - name: Static checks
        run: python -m compileall src
";

pub struct ScaffoldWriter;

impl Generator for ScaffoldWriter {
    fn generate(&self, paths: &ProjectPaths) -> Result<()> {
        paths.ensure_root()?;
        write_if_different(&paths.join("src/backend/main.py"), BACKEND_MAIN)?;
        write_if_different(&paths.join("src/frontend/src/main.tsx"), FRONTEND_MAIN)?;
        write_if_different(
            &paths.join("src/frontend/src/design-system/tokens.ts"),
            TOKENS_TS,
        )?;
        write_if_different(
            &paths.join("src/frontend/src/design-system/BaseButton.tsx"),
            BASE_BUTTON_TSX,
        )?;

        let readme_path = paths.join("README.md");
        let existing = fs::read_to_string(&readme_path)
            .unwrap_or_else(|_| "# Project Workspace\n".to_string());
        if !existing.contains("## Orchestrator Mode") {
            let combined = format!("{}\n{}", existing.trim_end(), README_APPENDIX);
            write_if_different(&readme_path, &combined)?;
        }

        write_if_different(&paths.join(".env.example"), ENV_EXAMPLE)?;
        write_if_different(&paths.join(".github/workflows/ci.yml"), CI_WORKFLOW)?;
        record_artifacts(paths, "step_3", SCAFFOLD_ARTIFACTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::IndexStore;
    use crate::validate::validate_step;
    use tempfile::tempdir;

    #[test]
    fn writes_all_scaffold_artifacts() {
        let dir = tempdir().unwrap();
        let paths = ProjectPaths::resolve(dir.path(), "demo").unwrap();
        ScaffoldWriter.generate(&paths).unwrap();
        for artifact in SCAFFOLD_ARTIFACTS {
            assert!(paths.join(artifact).is_file(), "{artifact} not written");
        }
    }

    #[test]
    fn step_3_validates_clean_after_generation() {
        let dir = tempdir().unwrap();
        let paths = ProjectPaths::resolve(dir.path(), "demo").unwrap();
        ScaffoldWriter.generate(&paths).unwrap();
        let states = validate_step(&paths, "step_3");
        assert_eq!(states.len(), 1);
        assert!(states[0].is_clean(), "issues: {:?}", states[0].issues());
    }

    #[test]
    fn readme_appendix_preserves_user_content() {
        let dir = tempdir().unwrap();
        let paths = ProjectPaths::resolve(dir.path(), "demo").unwrap();
        paths.ensure_root().unwrap();
        fs::write(paths.join("README.md"), "# My Own Title\n\nCustom intro.\n").unwrap();

        ScaffoldWriter.generate(&paths).unwrap();
        let readme = fs::read_to_string(paths.join("README.md")).unwrap();
        assert!(readme.contains("# My Own Title"));
        assert!(readme.contains("Custom intro."));
        assert!(readme.contains("## Orchestrator Mode"));
    }

    #[test]
    fn readme_appendix_is_not_duplicated() {
        let dir = tempdir().unwrap();
        let paths = ProjectPaths::resolve(dir.path(), "demo").unwrap();
        ScaffoldWriter.generate(&paths).unwrap();
        ScaffoldWriter.generate(&paths).unwrap();
        let readme = fs::read_to_string(paths.join("README.md")).unwrap();
        assert_eq!(readme.matches("## Orchestrator Mode").count(), 1);
    }

    #[test]
    fn regeneration_keeps_index_hashes_stable() {
        let dir = tempdir().unwrap();
        let paths = ProjectPaths::resolve(dir.path(), "demo").unwrap();
        ScaffoldWriter.generate(&paths).unwrap();
        let first = IndexStore::for_project(&paths).load();
        ScaffoldWriter.generate(&paths).unwrap();
        let second = IndexStore::for_project(&paths).load();
        for artifact in SCAFFOLD_ARTIFACTS {
            assert_eq!(first.recorded_hash(artifact), second.recorded_hash(artifact));
        }
    }
}
