//! Text rendering for `TurnReport`.
//!
//! `render` is a pure function over the structured report. `finalize` owns
//! the self-referential part of the contract: the cost block is embedded in
//! the very response being measured, so the output-token estimate is
//! computed once against the cost-free rendering, embedded, re-measured, and
//! corrected at most one more time. One correction pass is the accepted
//! approximation; the estimate is not iterated to convergence.

use crate::cost::{CostRates, CostReport, TokenLedger, estimate_tokens};
use crate::engine::report::TurnReport;

/// Render the report to the fixed text layout.
pub fn render(report: &TurnReport) -> String {
    let header = &report.header;
    let agent_summary = if header.agent_summary.is_empty() {
        "No agents".to_string()
    } else {
        header.agent_summary.join(" | ")
    };
    let ui_header = format!(
        "[{}] — {} — {}",
        header.project, header.step_title, agent_summary
    );

    let status_section = report
        .status
        .iter()
        .map(|line| format!("- {line}"))
        .collect::<Vec<_>>()
        .join("\n");
    let artifacts_section = if report.artifacts.is_empty() {
        "No file changes this step.".to_string()
    } else {
        report
            .artifacts
            .iter()
            .map(|a| format!("- {}: {}", a.path, a.note))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let diffs_section = if report.diffs.is_empty() {
        "(none)".to_string()
    } else {
        report
            .diffs
            .iter()
            .map(|d| format!("- {d}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let checks_section = if report.checks.is_empty() {
        "No checks executed.".to_string()
    } else {
        report
            .checks
            .iter()
            .map(|c| format!("- {} — {}", c.label, c.verdict))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let cost_section = report.cost.as_ref().map(cost_block).unwrap_or_default();

    [
        "STATUS".to_string(),
        status_section,
        "UI HEADER".to_string(),
        ui_header,
        "ARTIFACTS (proposed)".to_string(),
        artifacts_section,
        "DIFF PREVIEW".to_string(),
        diffs_section,
        "CHECKS".to_string(),
        checks_section,
        "COST".to_string(),
        cost_section,
        "NEXT STEP".to_string(),
        format!("Awaiting response to: {}", report.prompt),
        "PROMPT".to_string(),
        "Yes".to_string(),
    ]
    .join("\n")
}

fn cost_block(cost: &CostReport) -> String {
    format!(
        "Token & Cost Report\n\
         tokens_in: {}\n\
         tokens_out: {}\n\
         tokens_total_this_turn: {}\n\
         cumulative_tokens: {}\n\
         est_cost_this_turn (USD): ${:.4}\n\
         est_cost_cumulative (USD): ${:.4}\n\
         next_step_cost_projection: {}",
        cost.tokens_in,
        cost.tokens_out,
        cost.tokens_total_this_turn,
        cost.cumulative_tokens,
        cost.est_cost_this_turn_usd,
        cost.est_cost_cumulative_usd,
        cost.next_step_cost_projection
    )
}

/// Fill in the cost block, update the ledger, and return the final text.
///
/// The report arrives with `cost: None`; it leaves with the corrected cost
/// embedded and matching the returned rendering.
pub fn finalize(
    report: &mut TurnReport,
    ledger: &mut TokenLedger,
    rates: &CostRates,
    tokens_in: u64,
    projection: &str,
) -> String {
    report.cost = None;
    let bare = render(report);
    let mut tokens_out = estimate_tokens(&bare);
    ledger.add_output(tokens_out);
    report.cost = Some(CostReport::compute(
        rates, ledger, tokens_in, tokens_out, projection,
    ));
    let mut text = render(report);

    // Embedding the cost block changed the length; correct once and stop.
    let remeasured = estimate_tokens(&text);
    if remeasured != tokens_out {
        ledger.adjust_output(remeasured as i64 - tokens_out as i64);
        tokens_out = remeasured;
        report.cost = Some(CostReport::compute(
            rates, ledger, tokens_in, tokens_out, projection,
        ));
        text = render(report);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::report::{ArtifactNote, CheckLine, StepHeader};

    fn sample_report() -> TurnReport {
        TurnReport {
            status: vec!["Existing outputs validated.".into()],
            header: StepHeader {
                project: "demo".into(),
                step_name: "step_1".into(),
                step_title: "Discovery & Intent".into(),
                agent_summary: vec!["ORCHESTRATOR: CLEAN".into()],
            },
            artifacts: vec![ArtifactNote {
                path: "docs/charter.md".into(),
                note: "exists".into(),
            }],
            diffs: vec![],
            checks: vec![CheckLine::pass(
                "docs/charter.md — exists, hash ok, sections ok",
            )],
            cost: None,
            prompt: "Approve the Solution Charter?".into(),
        }
    }

    #[test]
    fn rendering_contains_all_fixed_sections() {
        let text = render(&sample_report());
        for section in [
            "STATUS",
            "UI HEADER",
            "ARTIFACTS (proposed)",
            "DIFF PREVIEW",
            "CHECKS",
            "COST",
            "NEXT STEP",
            "PROMPT",
        ] {
            assert!(text.contains(section), "missing section {section}");
        }
        assert!(text.contains("[demo] — Discovery & Intent — ORCHESTRATOR: CLEAN"));
        assert!(text.contains("Awaiting response to: Approve the Solution Charter?"));
    }

    #[test]
    fn empty_collections_render_placeholders() {
        let mut report = sample_report();
        report.artifacts.clear();
        report.checks.clear();
        report.header.agent_summary.clear();
        let text = render(&report);
        assert!(text.contains("No file changes this step."));
        assert!(text.contains("No checks executed."));
        assert!(text.contains("(none)"));
        assert!(text.contains("— No agents"));
    }

    #[test]
    fn finalize_embeds_cost_matching_final_text() {
        let mut report = sample_report();
        let mut ledger = TokenLedger::default();
        ledger.add_input(25);
        let text = finalize(&mut report, &mut ledger, &CostRates::default(), 25, "10k");

        let cost = report.cost.as_ref().unwrap();
        assert_eq!(cost.tokens_in, 25);
        // The embedded tokens_out matches a re-measure of the final text.
        assert_eq!(cost.tokens_out, estimate_tokens(&text));
        assert!(text.contains("Token & Cost Report"));
        assert!(text.contains(&format!("tokens_out: {}", cost.tokens_out)));
    }

    #[test]
    fn finalize_updates_ledger_with_corrected_output() {
        let mut report = sample_report();
        let mut ledger = TokenLedger::default();
        ledger.add_input(10);
        let text = finalize(&mut report, &mut ledger, &CostRates::default(), 10, "10k");
        assert_eq!(ledger.output_tokens, estimate_tokens(&text));
        assert_eq!(ledger.input_tokens, 10);
    }

    #[test]
    fn finalize_is_single_correction_not_convergence() {
        // Two renders at most: the cost block's digit widths may still be
        // off by a token in pathological cases, and that is accepted.
        let mut report = sample_report();
        let mut ledger = TokenLedger::default();
        let text = finalize(&mut report, &mut ledger, &CostRates::default(), 0, "10k");
        let cost = report.cost.as_ref().unwrap();
        // Within one token of a fresh measure.
        let fresh = estimate_tokens(&text);
        assert!(cost.tokens_out.abs_diff(fresh) <= 1);
    }
}
