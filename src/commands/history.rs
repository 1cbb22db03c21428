// ABOUTME: History and show command implementations.
// ABOUTME: Lists deploy summaries and prints single deploy records.

use shipwright::app::AppFilter;
use shipwright::error::Result;
use shipwright::output::Output;

use super::Workspace;
use crate::cli::HistoryArgs;

/// List deploys of the apps selected by `args`.
pub async fn history(workspace: &Workspace, args: HistoryArgs, output: &Output) -> Result<()> {
    let filter = AppFilter {
        names: args.apps,
        pool: args.pool,
        team: args.team,
    };
    let limit = args.limit.unwrap_or(workspace.config.history.limit);

    let records = workspace
        .history()?
        .list(&filter, args.skip, limit)
        .await?;
    output.records(&records);
    Ok(())
}

/// Print one deploy in full.
pub async fn show(workspace: &Workspace, id: &str, output: &Output) -> Result<()> {
    let record = workspace.history()?.get(id).await?;
    output.record(&record);
    Ok(())
}
