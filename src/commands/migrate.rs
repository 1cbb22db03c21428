// ABOUTME: Migrate command implementation.
// ABOUTME: Moves legacy deploy rows into the event log and saves it.

use shipwright::error::Result;
use shipwright::migrate::migrate_deploys_to_events;
use shipwright::output::Output;

use super::Workspace;

pub async fn migrate(workspace: &Workspace, output: &Output) -> Result<()> {
    let legacy = workspace.data.load_legacy_deploys()?;
    let apps = workspace.apps()?;
    let events = workspace.events()?;

    output.progress(&format!(
        "Migrating legacy deploys in {}",
        workspace.data.root().display()
    ));

    let result = migrate_deploys_to_events(&legacy, apps.as_ref(), events.as_ref()).await;

    // Rows inserted before a failure stay migrated.
    if result.as_ref().map_or(true, |report| report.migrated > 0) {
        workspace.data.save_events(&events)?;
    }

    output.migration(&result?);
    Ok(())
}
