//! Typed error taxonomy for the stepgate engine.
//!
//! Two kinds of failure exist in the core:
//! - `EngineError`: user-correctable or programming errors surfaced by the
//!   state machine (bad project name, unknown step name)
//! - `DecodeError`: failures at the storage boundary; callers map these to
//!   default documents, never propagate them into the turn flow

use thiserror::Error;

/// Errors surfaced by the orchestration state machine and catalog.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The project name normalized to an empty identifier. User-correctable:
    /// the state machine re-prompts without changing state.
    #[error("Project name must contain at least one alphanumeric character")]
    InvalidName,

    /// A step name outside the static catalog was requested. The catalog is
    /// complete, so this indicates a programming error.
    #[error("Unknown step '{0}'")]
    UnknownStep(String),
}

/// Failure to decode a persisted JSON document.
///
/// Session, index, and lock loads treat any `DecodeError` as "document
/// absent" and fall back to the default value. The mapping happens at each
/// call site so the fallback policy stays visible and testable.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
