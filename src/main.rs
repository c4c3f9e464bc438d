use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "stepgate")]
#[command(version, about = "Approval-gated project workflow engine")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding all project roots. Overrides stepgate.toml.
    #[arg(long, global = true)]
    pub projects_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the interactive approval-gated workflow conversation
    Chat,
    /// Show the saved session state for a project
    Status { name: String },
    /// List the step catalog in order
    Steps,
    /// Validate a project's artifacts for its current step
    Validate {
        name: String,
        /// Step to validate instead of the session's current step
        #[arg(short, long)]
        step: Option<String>,
    },
    /// Inspect a project's advisory lock
    Lock { name: String },
    /// Release a project's advisory lock
    Release { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = cmd::load_config()?;
    if let Some(root) = cli.projects_root.clone() {
        config.projects_root = root;
    }

    match &cli.command {
        Commands::Chat => cmd::cmd_chat(config).await?,
        Commands::Status { name } => cmd::cmd_status(&config, name)?,
        Commands::Steps => cmd::cmd_steps(),
        Commands::Validate { name, step } => cmd::cmd_validate(&config, name, step.as_deref())?,
        Commands::Lock { name } => cmd::cmd_lock(&config, name)?,
        Commands::Release { name } => cmd::cmd_release(&config, name)?,
    }

    Ok(())
}
