// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use shipwright::types::AppName;

#[derive(Parser)]
#[command(name = "shipwright")]
#[command(about = "Deploy history and legacy deploy migration for application platforms")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output for CI
    #[arg(long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Output JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new shipwright.yml configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// List deploys, newest first
    History(HistoryArgs),

    /// Show one deploy with its log and diff
    Show {
        /// Deploy id
        id: String,
    },

    /// Copy legacy deploy rows into the event log
    Migrate,
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Only deploys of this app (repeatable)
    #[arg(short, long = "app")]
    pub apps: Vec<AppName>,

    /// Only apps in this pool
    #[arg(long)]
    pub pool: Option<String>,

    /// Only apps owned by this team
    #[arg(long)]
    pub team: Option<String>,

    /// Number of deploys to skip
    #[arg(long, default_value_t = 0)]
    pub skip: usize,

    /// Maximum number of deploys (defaults to history.limit, 0 lists all)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}
