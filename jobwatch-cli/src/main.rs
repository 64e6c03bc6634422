//! Jobwatch CLI
//!
//! Command-line interface for watching asynchronous jobs on a marker-based
//! status service: generate a session, register it, and poll until the job
//! finishes or polling gives out.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "jobwatch")]
#[command(about = "Watch asynchronous jobs on a polling status service", long_about = None)]
struct Cli {
    /// Job service URL
    #[arg(long, env = "JOBWATCH_SERVER", default_value = "http://localhost:8080")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobwatch_cli=info,jobwatch_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server,
    };

    handle_command(cli.command, &config).await
}
