//! CLI command implementations.
//!
//! | Module    | Commands handled                                |
//! |-----------|--------------------------------------------------|
//! | `chat`    | `Chat`                                           |
//! | `inspect` | `Status`, `Steps`, `Validate`, `Lock`, `Release` |

pub mod chat;
pub mod inspect;

pub use chat::cmd_chat;
pub use inspect::{cmd_lock, cmd_release, cmd_status, cmd_steps, cmd_validate};

use anyhow::Result;
use stepgate::config::StepgateConfig;

/// Load `stepgate.toml` from the current directory, falling back to defaults.
pub fn load_config() -> Result<StepgateConfig> {
    let cwd = std::env::current_dir()?;
    StepgateConfig::load_from(&cwd)
}
