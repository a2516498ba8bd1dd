use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

mod bootstrap;
mod commands;

use bootstrap::AppBootstrap;
use commands::ProjectCommand;

#[derive(Parser)]
#[command(name = "devdeck")]
#[command(about = "devdeck - catalog local and remote projects", long_about = None)]
struct Cli {
    /// Config directory (defaults to $DEVDECK_CONFIG_DIR, then the platform config dir)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Project(ProjectCommand),
    /// Interactive shell sharing one session across commands
    Shell,
}

async fn run(cli: Cli) -> Result<()> {
    let bootstrap = AppBootstrap::init(cli.config_dir)?;
    let coordinator = bootstrap.coordinator();

    match cli.command {
        Commands::Project(command) => commands::projects::run(&coordinator, command).await?,
        Commands::Shell => commands::shell::run(&coordinator).await?,
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            ExitCode::FAILURE
        }
    }
}
