//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod session;
mod watch;

pub use watch::KindArg;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a fresh session identifier
    Session,
    /// Register a session with the job service
    Register {
        /// Session identifier (generated if omitted)
        #[arg(long)]
        session: Option<String>,
    },
    /// Poll a job until it finishes
    Watch {
        /// Session identifier (generated and registered if omitted)
        #[arg(long)]
        session: Option<String>,

        /// Which job flow to watch
        #[arg(long, value_enum, default_value_t = KindArg::Task)]
        kind: KindArg,

        /// Print a JSON report instead of streaming bodies
        #[arg(long)]
        json: bool,
    },
}

/// Handle a top-level command
///
/// Routes commands to their respective handlers.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Session => session::print_session(),
        Commands::Register { session } => session::handle_register(config, session).await,
        Commands::Watch {
            session,
            kind,
            json,
        } => watch::handle_watch(config, session, kind, json).await,
    }
}
