//! Built-in artifact generators and the `(step, agent)` registry.
//!
//! The engine only knows that a generator deterministically (re)writes a
//! known file set for its `(step, agent)` pair; it never trusts a generator's
//! return value and always re-validates afterwards. External generators plug
//! in through the same `Generator` trait.

pub mod blueprints;
pub mod bootstrap;
pub mod charter;
pub mod scaffold;
pub mod ui_foundations;

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::hash::hash_file;
use crate::naming::ProjectPaths;
use crate::store::IndexStore;

/// A deterministic writer for one agent's artifacts within one step.
pub trait Generator: Send + Sync {
    /// (Re)write this generator's file set under the project root. Must be
    /// idempotent: identical state in, identical bytes out.
    fn generate(&self, paths: &ProjectPaths) -> Result<()>;
}

/// Registry of generators keyed by `(step, agent)`.
pub struct GeneratorRegistry {
    generators: HashMap<(String, String), Box<dyn Generator>>,
}

impl GeneratorRegistry {
    pub fn empty() -> Self {
        Self {
            generators: HashMap::new(),
        }
    }

    /// The built-in set covering every `(step, agent)` pair the catalog
    /// declares outputs for.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("step_0", "orchestrator", Box::new(bootstrap::Bootstrap));
        registry.register("step_1", "orchestrator", Box::new(charter::CharterWriter));
        registry.register(
            "step_2",
            "orchestrator",
            Box::new(blueprints::BlueprintWriter),
        );
        registry.register(
            "step_2",
            "ui_designer",
            Box::new(ui_foundations::UiFoundations),
        );
        registry.register("step_3", "orchestrator", Box::new(scaffold::ScaffoldWriter));
        registry
    }

    pub fn register(&mut self, step: &str, agent: &str, generator: Box<dyn Generator>) {
        self.generators
            .insert((step.to_string(), agent.to_string()), generator);
    }

    pub fn get(&self, step: &str, agent: &str) -> Option<&dyn Generator> {
        self.generators
            .get(&(step.to_string(), agent.to_string()))
            .map(|g| g.as_ref())
    }
}

/// Write `content` to `path` unless the file already holds exactly those
/// bytes. Skipping the identical write keeps generators no-op on re-entry.
pub(crate) fn write_if_different(path: &Path, content: &str) -> Result<()> {
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == content {
            return Ok(());
        }
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Record the current hashes of `relative_paths` in the project index under
/// `step`, then persist the index.
pub(crate) fn record_artifacts(
    paths: &ProjectPaths,
    step: &str,
    relative_paths: &[&str],
) -> Result<()> {
    let store = IndexStore::for_project(paths);
    let mut index = store.load();
    for relative in relative_paths {
        let hash = hash_file(&paths.join(relative))
            .with_context(|| format!("Failed to hash generated artifact {relative}"))?;
        index.record(relative, hash, step);
    }
    store.save(&index)
}
