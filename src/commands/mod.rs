// ABOUTME: Command module aggregator for the shipwright CLI.
// ABOUTME: Re-exports history, show, and migrate command handlers.

mod history;
mod migrate;
mod workspace;

pub use history::{history, show};
pub use migrate::migrate;
pub use workspace::Workspace;
