// ABOUTME: Entry point for the shipwright CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::Workspace;
use shipwright::config;
use shipwright::error::Result;
use shipwright::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let output = Output::new(mode);

    if let Err(e) = run(cli.command, &output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(command: Commands, output: &Output) -> Result<()> {
    let cwd = env::current_dir()?;

    match command {
        Commands::Init { force } => {
            let path = config::init_config(&cwd, force)?;
            output.success(&format!("Created {}", path.display()));
            Ok(())
        }
        Commands::History(args) => {
            let workspace = Workspace::discover(&cwd)?;
            commands::history(&workspace, args, output).await
        }
        Commands::Show { id } => {
            let workspace = Workspace::discover(&cwd)?;
            commands::show(&workspace, &id, output).await
        }
        Commands::Migrate => {
            let workspace = Workspace::discover(&cwd)?;
            commands::migrate(&workspace, output).await
        }
    }
}
