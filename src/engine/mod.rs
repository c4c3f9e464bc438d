//! The orchestration state machine.
//!
//! One engine drives one conversation through the turn protocol: collect a
//! project name, offer reuse of an existing project, regenerate dirty
//! artifacts, and advance only on an explicit "yes" at each gate.
//! Re-entering a step always re-runs validation; a previously clean step is
//! never assumed to still be clean.

pub mod report;

use anyhow::{Context, Result};
use chrono::Local;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::catalog::{self, StepDefinition};
use crate::config::StepgateConfig;
use crate::cost::{TokenLedger, estimate_tokens, projection_for_step};
use crate::engine::report::{ArtifactNote, CheckLine, StepHeader, TurnReport};
use crate::generators::GeneratorRegistry;
use crate::naming::ProjectPaths;
use crate::probe::{inspect_lock, prefetch_hash_sample, probe_existing_project};
use crate::render;
use crate::store::{LockState, SessionStore};
use crate::validate::{AgentValidationState, validate_step};

/// Per-conversation state. Not persisted; the durable state lives in the
/// session document.
#[derive(Default)]
pub struct ConversationState {
    pub project: Option<ProjectPaths>,
    pub display_name: Option<String>,
    pub current_step: String,
    pub awaiting_reuse_confirmation: bool,
    pub awaiting_step_confirmation: bool,
    pub summary: BTreeMap<String, String>,
    pub ledger: TokenLedger,
}

/// One completed turn: the structured report plus its rendered text.
#[derive(Debug, Clone)]
pub struct Turn {
    pub report: TurnReport,
    pub text: String,
}

/// The conversation engine.
pub struct Engine {
    config: StepgateConfig,
    registry: GeneratorRegistry,
    state: ConversationState,
}

impl Engine {
    pub fn new(config: StepgateConfig) -> Self {
        Self::with_registry(config, GeneratorRegistry::builtin())
    }

    pub fn with_registry(config: StepgateConfig, registry: GeneratorRegistry) -> Self {
        Self {
            config,
            registry,
            state: ConversationState {
                current_step: catalog::first_step_name(),
                ..ConversationState::default()
            },
        }
    }

    /// The resolved project, once a name has been accepted.
    pub fn project(&self) -> Option<&ProjectPaths> {
        self.state.project.as_ref()
    }

    /// True while the conversation is waiting on the reuse decision for an
    /// existing project.
    pub fn pending_reuse(&self) -> bool {
        self.state.awaiting_reuse_confirmation
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.state.ledger
    }

    /// Advance the conversation by one turn.
    pub async fn handle_turn(&mut self, user_text: &str) -> Result<Turn> {
        let tokens_in = estimate_tokens(user_text);
        self.state.ledger.add_input(tokens_in);

        if self.state.project.is_none() {
            return self.handle_project_name(user_text, tokens_in).await;
        }
        if self.state.awaiting_reuse_confirmation {
            return self.handle_reuse_confirmation(user_text, tokens_in).await;
        }
        self.handle_step_flow(user_text, tokens_in).await
    }

    async fn handle_project_name(&mut self, user_text: &str, tokens_in: u64) -> Result<Turn> {
        let candidate = user_text.trim();
        let paths = match ProjectPaths::resolve(&self.config.projects_root, candidate) {
            Ok(paths) => paths,
            Err(err) => {
                let status = if candidate.is_empty() {
                    "Project name required before proceeding.".to_string()
                } else {
                    err.to_string()
                };
                return Ok(self.respond(
                    tokens_in,
                    vec![status],
                    &catalog::first_step(),
                    vec!["DIRTY: session".into(), "DIRTY: index".into()],
                    vec![],
                    vec![],
                    vec![CheckLine::fail(
                        "Missing project name prevents session initialisation",
                    )],
                    "Provide a project name to begin?".to_string(),
                ));
            }
        };

        self.state.display_name = Some(candidate.to_string());
        debug!("probing project {}", paths.name());
        let (probe, sample, lock) = tokio::join!(
            probe_existing_project(&paths),
            prefetch_hash_sample(&paths, self.config.hash_sample_size),
            inspect_lock(&paths, self.config.lock_ttl()),
        );

        if probe.exists {
            let last_step = probe.last_step.unwrap_or_else(catalog::first_step_name);
            let last_updated = probe
                .last_updated
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string());
            let sample_preview = sample.preview();
            self.state.summary = BTreeMap::from([
                ("last_step".to_string(), last_step.clone()),
                ("last_updated".to_string(), last_updated),
                ("file_count".to_string(), probe.file_count.to_string()),
                ("lock_status".to_string(), lock.status.to_string()),
                ("hash_sample".to_string(), sample_preview.clone()),
            ]);
            self.state.project = Some(paths);
            self.state.awaiting_reuse_confirmation = true;

            let lock_check = if lock.status == LockState::Active {
                CheckLine::fail("Active lock detected")
            } else {
                CheckLine::pass(format!("Lock status: {}", lock.status))
            };
            let artifacts = sample
                .entries
                .iter()
                .map(|(path, hash)| ArtifactNote {
                    path: path.clone(),
                    note: format!("hash {}", hash.as_deref().unwrap_or("missing")),
                })
                .collect();
            return Ok(self.respond(
                tokens_in,
                vec![
                    "Existing project detected.".to_string(),
                    format!("Last step: {last_step}"),
                    format!("Lock status: {}", lock.status),
                    format!("Sample hashes: {sample_preview}"),
                ],
                &catalog::first_step(),
                vec![if lock.status == LockState::Active {
                    "DIRTY: locked".to_string()
                } else {
                    "CLEAN: pending review".to_string()
                }],
                artifacts,
                vec![],
                vec![
                    CheckLine::pass("Probe existing project metadata"),
                    CheckLine::pass(format!("Prefetch index sample — {sample_preview}")),
                    lock_check,
                ],
                self.reuse_prompt(),
            ));
        }

        // New project: synthesize step 0, then validate what was written
        // rather than trusting the generator.
        info!("creating project {}", paths.name());
        self.state.project = Some(paths);
        let agent_states = self.ensure_outputs("step_0")?;
        self.state.current_step = catalog::first_step_name();
        self.state.awaiting_step_confirmation = true;

        let step = catalog::first_step();
        let prompt = step.gate_prompt_for(self.display_name());
        let checks = check_lines(&agent_states);
        Ok(self.respond(
            tokens_in,
            vec![
                "Project scaffolding created.".to_string(),
                "Session + index initialised.".to_string(),
            ],
            &step,
            agent_summary(&agent_states),
            vec![
                ArtifactNote {
                    path: ".stepgate/session.json".into(),
                    note: "Project session metadata".into(),
                },
                ArtifactNote {
                    path: ".stepgate/file_index.json".into(),
                    note: "Tracked files & folders".into(),
                },
            ],
            vec!["Initial session and index files created.".to_string()],
            checks,
            prompt,
        ))
    }

    async fn handle_reuse_confirmation(&mut self, user_text: &str, tokens_in: u64) -> Result<Turn> {
        match parse_decision(user_text) {
            None => Ok(self.respond(
                tokens_in,
                vec!["Please reply Yes or No to confirm project reuse.".to_string()],
                &catalog::first_step(),
                vec!["PENDING: awaiting confirmation".to_string()],
                vec![],
                vec![],
                vec![CheckLine::fail("Confirmation required before proceeding")],
                self.reuse_prompt(),
            )),
            Some(false) => {
                let normalized = self
                    .state
                    .project
                    .as_ref()
                    .map(|p| p.name().to_string())
                    .unwrap_or_default();
                let suggestion = format!(
                    "Consider using '{normalized}-v2' or '{normalized}-{}'.",
                    Local::now().format("%Y%m%d-%H%M")
                );
                self.state.project = None;
                self.state.display_name = None;
                self.state.awaiting_reuse_confirmation = false;
                self.state.current_step = catalog::first_step_name();
                self.state.summary.clear();
                Ok(self.respond(
                    tokens_in,
                    vec!["Reuse declined.".to_string(), suggestion],
                    &catalog::first_step(),
                    vec!["DIRTY: awaiting new project name".to_string()],
                    vec![],
                    vec![],
                    vec![CheckLine::pass("Existing project left untouched")],
                    "Provide a new project name to begin?".to_string(),
                ))
            }
            Some(true) => {
                self.state.awaiting_reuse_confirmation = false;
                let paths = self
                    .state
                    .project
                    .clone()
                    .context("Reuse confirmed without a resolved project")?;
                let session = SessionStore::for_project(&paths).load();
                self.state.current_step = session.current_step;
                self.state.awaiting_step_confirmation = true;
                let step = self.state.current_step.clone();
                self.render_step(&step, tokens_in)
            }
        }
    }

    async fn handle_step_flow(&mut self, user_text: &str, tokens_in: u64) -> Result<Turn> {
        if !self.state.awaiting_step_confirmation {
            // Not a gated answer: re-run the clean/dirty check for the
            // current step unconditionally.
            let step = self.state.current_step.clone();
            return self.render_step(&step, tokens_in);
        }

        let current = catalog::get_step(&self.state.current_step)?;
        match parse_decision(user_text) {
            None => {
                let prompt = current.gate_prompt_for(self.display_name());
                Ok(self.respond(
                    tokens_in,
                    vec!["Please respond with Yes or No to advance.".to_string()],
                    &current,
                    vec!["PENDING: awaiting confirmation".to_string()],
                    vec![],
                    vec![],
                    vec![CheckLine::fail("Approval required to continue")],
                    prompt,
                ))
            }
            Some(false) => Ok(self.respond(
                tokens_in,
                vec!["Step approval denied. Provide guidance to adjust outputs.".to_string()],
                &current,
                vec!["DIRTY: awaiting revisions".to_string()],
                vec![],
                vec![],
                vec![CheckLine::fail("Awaiting user feedback")],
                "Would you like to re-run validations after adjustments?".to_string(),
            )),
            Some(true) => {
                // An approval covers the outputs as they exist on disk. Repair
                // anything tampered with or deleted since the gate was shown;
                // if regeneration cannot produce a clean state, hold the gate.
                let repaired = self.ensure_outputs(&current.name)?;
                if !repaired.iter().all(|s| s.is_clean()) {
                    return self.render_step(&current.name, tokens_in);
                }
                self.advance_from(&current, tokens_in)
            }
        }
    }

    fn advance_from(&mut self, current: &StepDefinition, tokens_in: u64) -> Result<Turn> {
        match catalog::next_step(&current.name)? {
            None => {
                // Terminal step approved: the workflow is complete and
                // current_step stays put.
                self.state.awaiting_step_confirmation = false;
                Ok(self.respond(
                    tokens_in,
                    vec!["Workflow complete.".to_string()],
                    current,
                    vec!["CLEAN: all steps".to_string()],
                    vec![],
                    vec![],
                    vec![CheckLine::pass("No further steps remaining")],
                    "Would you like to restart?".to_string(),
                ))
            }
            Some(next) => {
                let paths = self
                    .state
                    .project
                    .clone()
                    .context("Step approved without a resolved project")?;
                let store = SessionStore::for_project(&paths);
                let mut session = store.load();
                session.record_approval(&current.name);
                session.current_step = next.name.clone();
                store.save(&session)?;
                info!("advanced {} to {}", paths.name(), next.name);
                self.state.current_step = next.name.clone();
                self.render_step(&next.name, tokens_in)
            }
        }
    }

    /// Validate, regenerate dirty agents, and render the gate response for
    /// `step_name`.
    fn render_step(&mut self, step_name: &str, tokens_in: u64) -> Result<Turn> {
        let definition = catalog::get_step(step_name)?;
        let agent_states = self.ensure_outputs(step_name)?;

        let mut artifacts = Vec::new();
        let mut diffs = Vec::new();
        for state in &agent_states {
            let issues = state.issues();
            if !issues.is_empty() {
                diffs.push(format!("{}: {}", state.agent, issues.join(", ")));
            }
            for result in &state.required_files {
                artifacts.push(ArtifactNote {
                    path: result.path.clone(),
                    note: if result.exists { "exists" } else { "missing" }.to_string(),
                });
            }
        }
        if diffs.is_empty() {
            diffs.push(format!(
                "Validated {} agent(s) for {}.",
                agent_states.len(),
                definition.title
            ));
        }

        let all_clean = agent_states.iter().all(|s| s.is_clean());
        let status = vec![
            if all_clean {
                "Existing outputs validated.".to_string()
            } else {
                "Rebuilt or flagged dirty artifacts.".to_string()
            },
            format!("Step: {}", definition.title),
        ];
        let checks = check_lines(&agent_states);
        let prompt = definition.gate_prompt_for(self.display_name());
        self.state.awaiting_step_confirmation = true;
        Ok(self.respond(
            tokens_in,
            status,
            &definition,
            agent_summary(&agent_states),
            artifacts,
            diffs,
            checks,
            prompt,
        ))
    }

    /// First validation pass; regenerate any dirty agent through the
    /// registered generator; second pass to confirm. The second pass is the
    /// verdict; a generator's silent no-op is fine, its word is not taken.
    fn ensure_outputs(&mut self, step_name: &str) -> Result<Vec<AgentValidationState>> {
        let paths = self
            .state
            .project
            .clone()
            .context("Validation requested without a resolved project")?;
        let first_pass = validate_step(&paths, step_name);
        for state in &first_pass {
            if !state.is_clean() {
                if let Some(generator) = self.registry.get(step_name, &state.agent) {
                    debug!("regenerating ({step_name}, {})", state.agent);
                    generator.generate(&paths)?;
                }
            }
        }
        Ok(validate_step(&paths, step_name))
    }

    fn display_name(&self) -> &str {
        self.state.display_name.as_deref().unwrap_or("pending_project")
    }

    fn reuse_prompt(&self) -> String {
        format!(
            "Reuse existing project '{}' and resume from the last saved step?",
            self.display_name()
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn respond(
        &mut self,
        tokens_in: u64,
        status: Vec<String>,
        step: &StepDefinition,
        agent_summary: Vec<String>,
        artifacts: Vec<ArtifactNote>,
        diffs: Vec<String>,
        checks: Vec<CheckLine>,
        prompt: String,
    ) -> Turn {
        let project = self
            .state
            .project
            .as_ref()
            .map(|p| p.name().to_string())
            .unwrap_or_else(|| "pending_project".to_string());
        let mut report = TurnReport {
            status,
            header: StepHeader {
                project,
                step_name: step.name.clone(),
                step_title: step.title.clone(),
                agent_summary,
            },
            artifacts,
            diffs,
            checks,
            cost: None,
            prompt,
        };
        let text = render::finalize(
            &mut report,
            &mut self.state.ledger,
            &self.config.rates,
            tokens_in,
            projection_for_step(&step.name),
        );
        Turn { report, text }
    }
}

/// Parse a trimmed, case-insensitive yes/no answer. Anything else is `None`
/// and re-prompts; ambiguous input never defaults to either branch.
fn parse_decision(user_text: &str) -> Option<bool> {
    match user_text.trim().to_lowercase().as_str() {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

fn agent_summary(states: &[AgentValidationState]) -> Vec<String> {
    states
        .iter()
        .map(|state| {
            format!(
                "{}: {}",
                state.agent.to_uppercase(),
                if state.is_clean() { "CLEAN" } else { "DIRTY" }
            )
        })
        .collect()
}

fn check_lines(states: &[AgentValidationState]) -> Vec<CheckLine> {
    let mut checks = Vec::new();
    for state in states {
        for result in &state.required_files {
            let label = format!(
                "{} — {}, {}, {}",
                result.path,
                if result.exists { "exists" } else { "missing" },
                if result.hash_matches { "hash ok" } else { "hash mismatch" },
                if result.sections_valid { "sections ok" } else { "sections missing" },
            );
            checks.push(if result.is_clean() {
                CheckLine::pass(label)
            } else {
                CheckLine::fail(label)
            });
        }
    }
    checks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::report::Verdict;
    use tempfile::tempdir;

    fn engine_in(dir: &std::path::Path) -> Engine {
        let config = StepgateConfig {
            projects_root: dir.to_path_buf(),
            ..StepgateConfig::default()
        };
        Engine::new(config)
    }

    #[tokio::test]
    async fn empty_project_name_reprompts_without_state_change() {
        let dir = tempdir().unwrap();
        let mut engine = engine_in(dir.path());
        let turn = engine.handle_turn("   ").await.unwrap();
        assert!(engine.project().is_none());
        assert_eq!(turn.report.prompt, "Provide a project name to begin?");
        assert_eq!(turn.report.header.project, "pending_project");
    }

    #[tokio::test]
    async fn symbol_only_project_name_reprompts() {
        let dir = tempdir().unwrap();
        let mut engine = engine_in(dir.path());
        let turn = engine.handle_turn("!!!").await.unwrap();
        assert!(engine.project().is_none());
        assert!(turn.report.status[0].contains("alphanumeric"));
    }

    #[tokio::test]
    async fn new_project_synthesizes_step_0() {
        let dir = tempdir().unwrap();
        let mut engine = engine_in(dir.path());
        let turn = engine.handle_turn("My App").await.unwrap();

        let paths = engine.project().unwrap();
        assert_eq!(paths.name(), "my_app");
        assert!(paths.session_path().is_file());
        assert!(paths.index_path().is_file());
        assert_eq!(turn.report.header.step_name, "step_0");
        assert!(turn.report.prompt.contains("'My App'"));
        assert!(
            turn.report
                .checks
                .iter()
                .all(|c| c.verdict == Verdict::Pass),
            "step 0 checks should pass: {:?}",
            turn.report.checks
        );
    }

    #[tokio::test]
    async fn existing_project_offers_reuse() {
        let dir = tempdir().unwrap();
        {
            let mut engine = engine_in(dir.path());
            engine.handle_turn("demo").await.unwrap();
        }
        let mut engine = engine_in(dir.path());
        let turn = engine.handle_turn("demo").await.unwrap();
        assert!(turn.report.status[0].contains("Existing project detected"));
        assert!(turn.report.prompt.contains("Reuse existing project"));
    }

    #[tokio::test]
    async fn ambiguous_reuse_answer_reprompts() {
        let dir = tempdir().unwrap();
        {
            let mut engine = engine_in(dir.path());
            engine.handle_turn("demo").await.unwrap();
        }
        let mut engine = engine_in(dir.path());
        engine.handle_turn("demo").await.unwrap();
        let turn = engine.handle_turn("maybe").await.unwrap();
        assert!(turn.report.status[0].contains("Yes or No"));
        assert!(turn.report.prompt.contains("Reuse existing project"));
    }

    #[tokio::test]
    async fn declining_reuse_clears_state_and_suggests_names() {
        let dir = tempdir().unwrap();
        {
            let mut engine = engine_in(dir.path());
            engine.handle_turn("demo").await.unwrap();
        }
        let mut engine = engine_in(dir.path());
        engine.handle_turn("demo").await.unwrap();
        let turn = engine.handle_turn("no").await.unwrap();
        assert!(engine.project().is_none());
        assert!(turn.report.status[1].contains("demo-v2"));
        assert_eq!(turn.report.prompt, "Provide a new project name to begin?");
    }

    #[tokio::test]
    async fn accepting_reuse_resumes_persisted_step() {
        let dir = tempdir().unwrap();
        {
            let mut engine = engine_in(dir.path());
            engine.handle_turn("demo").await.unwrap();
            engine.handle_turn("yes").await.unwrap(); // step_0 -> step_1
        }
        let mut engine = engine_in(dir.path());
        engine.handle_turn("demo").await.unwrap();
        let turn = engine.handle_turn("yes").await.unwrap();
        assert_eq!(turn.report.header.step_name, "step_1");
    }

    #[tokio::test]
    async fn yes_advances_and_persists_current_step() {
        let dir = tempdir().unwrap();
        let mut engine = engine_in(dir.path());
        engine.handle_turn("demo").await.unwrap();
        let turn = engine.handle_turn("yes").await.unwrap();

        assert_eq!(turn.report.header.step_name, "step_1");
        let paths = engine.project().unwrap();
        let session = SessionStore::for_project(paths).load();
        assert_eq!(session.current_step, "step_1");
        assert_eq!(session.history.len(), 1);
        assert_eq!(session.history[0].step, "step_0");
        // The charter was generated and validated clean.
        assert!(paths.join("docs/charter.md").is_file());
        assert!(turn.report.header.agent_summary[0].contains("CLEAN"));
    }

    #[tokio::test]
    async fn no_at_gate_stays_on_step_without_mutation() {
        let dir = tempdir().unwrap();
        let mut engine = engine_in(dir.path());
        engine.handle_turn("demo").await.unwrap();
        engine.handle_turn("yes").await.unwrap();

        let paths = engine.project().unwrap().clone();
        let before = std::fs::read(paths.join("docs/charter.md")).unwrap();
        let session_before = SessionStore::for_project(&paths).load();

        let turn = engine.handle_turn("no").await.unwrap();
        assert!(turn.report.status[0].contains("denied"));
        assert_eq!(turn.report.header.step_name, "step_1");

        let after = std::fs::read(paths.join("docs/charter.md")).unwrap();
        assert_eq!(before, after);
        let session_after = SessionStore::for_project(&paths).load();
        assert_eq!(session_before.current_step, session_after.current_step);
    }

    #[tokio::test]
    async fn ambiguous_gate_answer_reprompts_without_side_effects() {
        let dir = tempdir().unwrap();
        let mut engine = engine_in(dir.path());
        engine.handle_turn("demo").await.unwrap();
        let turn = engine.handle_turn("sure, go ahead").await.unwrap();
        assert!(turn.report.status[0].contains("Yes or No"));
        assert_eq!(turn.report.header.step_name, "step_0");
    }

    #[tokio::test]
    async fn deleted_artifact_is_regenerated_on_reentry() {
        let dir = tempdir().unwrap();
        let mut engine = engine_in(dir.path());
        engine.handle_turn("demo").await.unwrap();
        engine.handle_turn("yes").await.unwrap(); // into step_1

        let paths = engine.project().unwrap().clone();
        std::fs::remove_file(paths.join("docs/charter.md")).unwrap();

        // A non-gate turn re-runs validation and regenerates.
        engine.state.awaiting_step_confirmation = false;
        let turn = engine.handle_turn("какой статус?").await.unwrap();
        assert!(paths.join("docs/charter.md").is_file());
        assert!(turn.report.header.agent_summary[0].contains("CLEAN"));
    }

    #[tokio::test]
    async fn terminal_step_approval_reaches_done_without_advancing() {
        let dir = tempdir().unwrap();
        let mut engine = engine_in(dir.path());
        engine.handle_turn("demo").await.unwrap();
        for _ in 0..7 {
            engine.handle_turn("yes").await.unwrap();
        }
        // Now gated on step_7; approving it completes the workflow.
        let turn = engine.handle_turn("yes").await.unwrap();
        assert!(turn.report.status[0].contains("Workflow complete"));
        assert_eq!(turn.report.prompt, "Would you like to restart?");

        let paths = engine.project().unwrap();
        let session = SessionStore::for_project(paths).load();
        assert_eq!(session.current_step, "step_7");
    }

    #[tokio::test]
    async fn every_turn_accumulates_tokens() {
        let dir = tempdir().unwrap();
        let mut engine = engine_in(dir.path());
        let turn = engine.handle_turn("demo project").await.unwrap();
        let cost = turn.report.cost.as_ref().unwrap();
        assert_eq!(cost.tokens_in, 3); // ceil(12 / 4)
        assert!(cost.tokens_out > 0);
        assert_eq!(engine.ledger().input_tokens, 3);
        assert_eq!(engine.ledger().output_tokens, cost.tokens_out);
    }
}
