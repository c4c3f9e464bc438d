//! Step-2 UI designer generator: design tokens, component library,
//! wireframe, and the accessibility/responsiveness checklists.

use anyhow::{Context, Result};
use serde_json::json;

use super::{Generator, record_artifacts, write_if_different};
use crate::naming::ProjectPaths;

/// Paths this generator owns, relative to the project root.
pub const UI_ARTIFACTS: &[&str] = &[
    "ui/design_tokens.json",
    "ui/component_library.md",
    "ui/wireframes/main.md",
    "ui/checklists/accessibility.md",
    "ui/checklists/responsiveness.md",
];

fn design_tokens() -> serde_json::Value {
    json!({
        "color": {
            "background": "#f4f6fb",
            "surface": "#ffffff",
            "primary": "#1f6feb",
            "primary_text": "#ffffff",
            "secondary": "#6e7781",
            "secondary_text": "#0a0c10",
            "border": "#d0d7de",
            "highlight": "#ffd33d",
            "danger": "#d1242f",
            "success": "#2da44e"
        },
        "spacing": { "xs": "4px", "sm": "8px", "md": "16px", "lg": "24px", "xl": "32px" },
        "radius": { "sm": "6px", "md": "12px", "lg": "18px" },
        "shadow": { "soft": "0 10px 25px rgba(15, 23, 42, 0.1)" },
        "typography": {
            "font_family": "'Inter', system-ui, sans-serif",
            "font_size_sm": "0.875rem",
            "font_size_md": "1rem",
            "font_size_lg": "1.125rem",
            "font_weight_regular": "400",
            "font_weight_semibold": "600"
        }
    })
}

const COMPONENT_LIBRARY_MD: &str = "\
# UI Component Library

## Component Inventory
- **BaseButton** — primary action button with prominence and hover states.
- **SurfaceCard** — elevated container for key summaries.
- **StatusChip** — compact status indicator for Clean/Dirty states.

## Usage Guidelines
- Use **BaseButton** for the primary call-to-action per screen.
- Combine **SurfaceCard** and **StatusChip** to emphasise gated approvals.
- Respect spacing tokens (`spacing.md`) between stacked components.
";

const WIREFRAME_MAIN_MD: &str = "\
# Wireframe — Project Orchestrator

## Layout
- **Header Banner**: displays project name, step title, and Clean/Dirty chips.
- **Chat Stream**: conversational updates with highlighted action items.
- **Artifact Drawer**: expandable panel listing generated documents and code paths.
- **Approval Footer**: sticky footer with Yes/No options and cost recap.

## Highlights
- Tokens apply to background gradients in header and chip accents.
- BaseButton emphasises the primary action with drop shadow (`shadow.soft`).
- StatusChip variants reflect Clean (success) vs Dirty (danger).
";

const ACCESSIBILITY_MD: &str = "\
# Accessibility Checklist
- [ ] Provide descriptive labels for all chat input prompts.
- [ ] Ensure sufficient color contrast (> 4.5:1) for text on colored backgrounds.
- [ ] Support keyboard navigation for approval buttons (Yes/No).
- [ ] Announce gate transitions to assistive technologies.
";

const RESPONSIVENESS_MD: &str = "\
# Responsiveness Checklist
- [ ] Maintain padding using spacing tokens across viewports.
- [ ] Collapse the summary sidebar beneath the main content below 768px.
- [ ] Use fluid typography scaling between `font_size_sm` and `font_size_lg`.
- [ ] Ensure BaseButton spans full width on screens < 480px.
";

pub struct UiFoundations;

impl Generator for UiFoundations {
    fn generate(&self, paths: &ProjectPaths) -> Result<()> {
        paths.ensure_root()?;
        let tokens = serde_json::to_string_pretty(&design_tokens())
            .context("Failed to serialize design tokens")?;
        write_if_different(&paths.join("ui/design_tokens.json"), &tokens)?;
        write_if_different(&paths.join("ui/component_library.md"), COMPONENT_LIBRARY_MD)?;
        write_if_different(&paths.join("ui/wireframes/main.md"), WIREFRAME_MAIN_MD)?;
        write_if_different(&paths.join("ui/checklists/accessibility.md"), ACCESSIBILITY_MD)?;
        write_if_different(
            &paths.join("ui/checklists/responsiveness.md"),
            RESPONSIVENESS_MD,
        )?;
        record_artifacts(paths, "step_2", UI_ARTIFACTS)
    }
}
