//! Token estimation and cost arithmetic for the turn-response contract.
//!
//! Estimates are deliberately linear: one token per four characters, rounded
//! up, priced at fixed per-million USD rates. The next-step projection is a
//! coarse bucket keyed on the upcoming step's weight, not a real model.

use serde::{Deserialize, Serialize};

/// Fixed per-million-token USD rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRates {
    #[serde(default = "default_input_rate")]
    pub input_per_million: f64,
    #[serde(default = "default_output_rate")]
    pub output_per_million: f64,
}

fn default_input_rate() -> f64 {
    5.0
}

fn default_output_rate() -> f64 {
    15.0
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            input_per_million: default_input_rate(),
            output_per_million: default_output_rate(),
        }
    }
}

/// Estimate tokens for a piece of text: `ceil(chars / 4)`. Counts
/// characters, not bytes, so multi-byte input is not over-billed.
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(4)
}

/// Running token totals for one conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenLedger {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenLedger {
    pub fn add_input(&mut self, tokens: u64) {
        self.input_tokens += tokens;
    }

    pub fn add_output(&mut self, tokens: u64) {
        self.output_tokens += tokens;
    }

    /// Apply a correction after the stabilization pass re-measured the
    /// rendered response. `delta` may be negative.
    pub fn adjust_output(&mut self, delta: i64) {
        self.output_tokens = self.output_tokens.saturating_add_signed(delta);
    }
}

/// The token/cost block embedded in every turn response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostReport {
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub tokens_total_this_turn: u64,
    pub cumulative_tokens: u64,
    pub est_cost_this_turn_usd: f64,
    pub est_cost_cumulative_usd: f64,
    pub next_step_cost_projection: String,
}

impl CostReport {
    /// Compute the report for one turn from the ledger state and rates.
    pub fn compute(
        rates: &CostRates,
        ledger: &TokenLedger,
        tokens_in: u64,
        tokens_out: u64,
        projection: &str,
    ) -> Self {
        let cost_in = tokens_in as f64 / 1_000_000.0 * rates.input_per_million;
        let cost_out = tokens_out as f64 / 1_000_000.0 * rates.output_per_million;
        let cumulative = ledger.input_tokens as f64 / 1_000_000.0 * rates.input_per_million
            + ledger.output_tokens as f64 / 1_000_000.0 * rates.output_per_million;
        Self {
            tokens_in,
            tokens_out,
            tokens_total_this_turn: tokens_in + tokens_out,
            cumulative_tokens: ledger.input_tokens + ledger.output_tokens,
            est_cost_this_turn_usd: cost_in + cost_out,
            est_cost_cumulative_usd: cumulative,
            next_step_cost_projection: projection.to_string(),
        }
    }
}

/// Coarse cost projection for whatever step is currently gated. The heavy
/// bucket covers the architecture/UI and scaffold steps; everything else is
/// standard.
pub fn projection_for_step(step_name: &str) -> &'static str {
    match step_name {
        "step_2" | "step_3" => "40k-80k tokens (~$0.80-$1.60)",
        _ => "10k-20k tokens (~$0.20-$0.40)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_rounds_up_to_whole_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("a"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens(&"x".repeat(4000)), 1000);
    }

    #[test]
    fn estimate_counts_characters_not_bytes() {
        // Five Cyrillic characters occupy ten bytes; the estimate must see
        // five characters and round up to two tokens.
        let text = "варка";
        assert_eq!(text.len(), 10);
        assert_eq!(estimate_tokens(text), 2);
        assert_eq!(estimate_tokens("日本語"), 1);
    }

    #[test]
    fn cost_report_matches_linear_formulas() {
        let rates = CostRates::default();
        let mut ledger = TokenLedger::default();
        ledger.add_input(1000);
        ledger.add_output(2000);

        let report = CostReport::compute(&rates, &ledger, 1000, 2000, "projection");
        assert_eq!(report.tokens_total_this_turn, 3000);
        assert_eq!(report.cumulative_tokens, 3000);
        assert!((report.est_cost_this_turn_usd - (0.005 + 0.03)).abs() < 1e-12);
        assert!((report.est_cost_cumulative_usd - 0.035).abs() < 1e-12);
    }

    #[test]
    fn ledger_adjustment_handles_negative_delta() {
        let mut ledger = TokenLedger::default();
        ledger.add_output(100);
        ledger.adjust_output(-30);
        assert_eq!(ledger.output_tokens, 70);
        ledger.adjust_output(5);
        assert_eq!(ledger.output_tokens, 75);
    }

    #[test]
    fn heavy_steps_project_the_larger_bucket() {
        assert!(projection_for_step("step_2").starts_with("40k"));
        assert!(projection_for_step("step_3").starts_with("40k"));
        assert!(projection_for_step("step_0").starts_with("10k"));
        assert!(projection_for_step("step_7").starts_with("10k"));
    }
}
