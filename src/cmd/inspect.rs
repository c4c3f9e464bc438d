//! Read-only project inspection commands.

use anyhow::{Result, bail};

use stepgate::catalog;
use stepgate::config::StepgateConfig;
use stepgate::naming::ProjectPaths;
use stepgate::store::{IndexStore, LockManager, SessionStore};
use stepgate::validate::validate_step;

fn resolve_existing(config: &StepgateConfig, name: &str) -> Result<ProjectPaths> {
    let paths = ProjectPaths::resolve(&config.projects_root, name)?;
    if !paths.exists() {
        bail!(
            "Project '{}' not found under {}",
            paths.name(),
            config.projects_root.display()
        );
    }
    Ok(paths)
}

pub fn cmd_status(config: &StepgateConfig, name: &str) -> Result<()> {
    let paths = resolve_existing(config, name)?;
    let session = SessionStore::for_project(&paths).load();
    let index = IndexStore::for_project(&paths).load();

    println!();
    println!("Stepgate Project Status");
    println!("=======================");
    println!();
    println!("Project:      {}", session.project_name);
    println!("Current step: {}", session.current_step);
    match session.last_updated {
        Some(when) => println!("Last updated: {}", when.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("Last updated: never"),
    }
    println!("Files tracked: {}", index.files.len());

    if !session.history.is_empty() {
        println!();
        println!("Recent approvals:");
        for entry in session.history.iter().rev().take(5) {
            println!(
                "  {} approved at {}",
                entry.step,
                entry.approved_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
    }
    println!();
    Ok(())
}

pub fn cmd_steps() {
    println!();
    println!("Workflow Steps");
    println!("==============");
    println!();
    for step in catalog::step_sequence() {
        println!("{}  {}", step.name, step.title);
        println!("        {}", console::style(&step.description).dim());
    }
    println!();
}

pub fn cmd_validate(config: &StepgateConfig, name: &str, step: Option<&str>) -> Result<()> {
    let paths = resolve_existing(config, name)?;
    let step_name = match step {
        Some(step) => catalog::get_step(step)?.name,
        None => SessionStore::for_project(&paths).load().current_step,
    };

    println!();
    println!("Validating {} against {}", paths.name(), step_name);
    println!();
    let states = validate_step(&paths, &step_name);
    if states.is_empty() {
        println!("No required outputs for this step.");
        println!();
        return Ok(());
    }

    let mut dirty = 0usize;
    for state in &states {
        let verdict = if state.is_clean() { "CLEAN" } else { "DIRTY" };
        println!("{}: {}", state.agent, verdict);
        for result in &state.required_files {
            let mark = if result.is_clean() {
                console::style("ok").green()
            } else {
                console::style("fail").red()
            };
            println!("  [{}] {}", mark, result.path);
        }
        if !state.is_clean() {
            dirty += 1;
            for issue in state.issues() {
                println!("  {}", console::style(issue).yellow());
            }
        }
    }
    println!();
    if dirty == 0 {
        println!("All outputs clean.");
    } else {
        println!("{dirty} agent(s) need regeneration. Run 'stepgate chat' to rebuild.");
    }
    println!();
    Ok(())
}

pub fn cmd_lock(config: &StepgateConfig, name: &str) -> Result<()> {
    let paths = resolve_existing(config, name)?;
    let record = LockManager::for_project(&paths).inspect(config.lock_ttl());

    println!();
    println!("Lock status: {}", record.status);
    if let Some(owner) = &record.owner {
        println!("Owner:       {owner}");
    }
    if let Some(started) = record.started_at {
        println!("Started at:  {}", started.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if record.is_stale {
        println!("The lock exceeded its TTL and no longer blocks new sessions.");
    }
    println!();
    Ok(())
}

pub fn cmd_release(config: &StepgateConfig, name: &str) -> Result<()> {
    let paths = resolve_existing(config, name)?;
    LockManager::for_project(&paths).release()?;
    println!("Lock released for {}.", paths.name());
    Ok(())
}
