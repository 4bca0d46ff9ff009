//! Battle client binary.
//!
//! Runs scripted scenarios against the battle runtime and validates content.
//!
//! ```bash
//! battle run tutorial
//! battle run gauntlet --json
//! battle run crates/battle/content/data/scenarios/gauntlet.ron --realtime
//! battle check --data-dir ./data
//! ```

mod commands;
mod dirs;
mod logging;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use commands::{Check, Run};

/// Turn-based battle runner
#[derive(Parser)]
#[command(name = "battle")]
#[command(about = "Runs scripted battle scenarios", long_about = None)]
#[command(version)]
struct Cli {
    /// Mirror debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Play a scenario and print the report
    Run(Run),

    /// Validate a content directory
    Check(Check),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _guard = logging::setup_logging(&dirs::log_dir(), cli.verbose)?;

    match cli.command {
        Command::Run(cmd) => cmd.execute().await,
        Command::Check(cmd) => cmd.execute().map(|()| ExitCode::SUCCESS),
    }
}
