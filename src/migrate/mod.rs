// ABOUTME: One-shot migration of legacy flat deploy rows into deploy events.
// ABOUTME: Ids are preserved so re-running skips rows that were already migrated.

mod error;

pub use error::MigrationError;

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::app::App;
use crate::deploy::{EndPayload, OtherPayload, StartPayload};
use crate::event::permission::PERM_APP_DEPLOY;
use crate::event::{AccessPolicy, Event, Kind, Owner, Target};
use crate::store::{AppStore, EventStore, LegacyDeploySource};
use crate::types::{AppName, EventId};

use error::{PayloadSnafu, SourceSnafu};

/// A deploy as stored before deploys became events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyDeploy {
    pub id: EventId,
    pub app: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, with = "humantime_serde")]
    pub duration: Duration,
    #[serde(default)]
    pub commit: String,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub can_rollback: bool,
    #[serde(default)]
    pub remove_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub diff: String,
}

/// Outcome of a migration run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Rows written as new events.
    pub migrated: usize,
    /// Rows whose event already existed.
    pub skipped: usize,
}

/// Build the deploy event equivalent to a legacy row.
///
/// `app` is the live app the row belongs to; when it no longer exists the
/// event gets an unscoped read policy.
pub fn legacy_to_event(row: &LegacyDeploy, app: Option<&App>) -> serde_json::Result<Event> {
    let mut event = Event::new(
        Target::app(row.app.as_str()),
        Owner::user(row.user.as_str()),
        Kind::permission(PERM_APP_DEPLOY),
    );
    event.unique_id = row.id.clone();
    event.start_time = row.timestamp;
    event.end_time = Some(end_time(row));
    event.error = row.error.clone();
    event.log = row.log.clone();
    event.remove_date = row.remove_date;
    event.allowed = AccessPolicy::for_app_events(app);

    event.start_custom_data = Some(serde_json::to_value(StartPayload {
        commit: row.commit.clone(),
        origin: row.origin.clone(),
        ..Default::default()
    })?);
    event.end_custom_data = Some(serde_json::to_value(EndPayload {
        image: row.image.clone(),
    })?);
    if !row.diff.is_empty() {
        event.other_custom_data = Some(serde_json::to_value(OtherPayload {
            diff: row.diff.clone(),
        })?);
    }

    Ok(event)
}

/// Start plus duration. A duration past chrono's range collapses to the
/// start time.
fn end_time(row: &LegacyDeploy) -> DateTime<Utc> {
    chrono::Duration::from_std(row.duration)
        .ok()
        .and_then(|duration| row.timestamp.checked_add_signed(duration))
        .unwrap_or_else(|| {
            tracing::debug!(
                "deploy {} has out-of-range duration {:?}, ending it at its start",
                row.id,
                row.duration
            );
            row.timestamp
        })
}

/// Copy every legacy deploy row into the event store.
///
/// Rows whose event already exists are skipped, so the migration can be
/// re-run. Any other failure stops the migration; rows inserted before it
/// stay inserted.
pub async fn migrate_deploys_to_events(
    source: &dyn LegacyDeploySource,
    apps: &dyn AppStore,
    events: &dyn EventStore,
) -> Result<MigrationReport, MigrationError> {
    let mut report = MigrationReport::default();
    let mut rows = source.legacy_deploys();

    while let Some(row) = rows.next().await {
        let row = row.context(SourceSnafu)?;
        let app = live_app(apps, &row.app).await;
        let event = legacy_to_event(&row, app.as_ref()).context(PayloadSnafu {
            id: row.id.clone(),
        })?;

        match events.insert(event).await {
            Ok(()) => report.migrated += 1,
            Err(e) if e.is_duplicate() => {
                tracing::debug!("deploy {} already migrated", row.id);
                report.skipped += 1;
            }
            Err(source) => return Err(MigrationError::Insert { id: row.id, source }),
        }
    }

    tracing::info!(
        "migrated {} legacy deploys, skipped {}",
        report.migrated,
        report.skipped
    );
    Ok(report)
}

async fn live_app(apps: &dyn AppStore, name: &str) -> Option<App> {
    let name = match AppName::new(name) {
        Ok(name) => name,
        Err(e) => {
            tracing::debug!("legacy deploy names invalid app {:?}: {}", name, e);
            return None;
        }
    };
    match apps.get_by_name(&name).await {
        Ok(app) => Some(app),
        Err(e) => {
            tracing::debug!("app {} not available for migration: {}", name, e);
            None
        }
    }
}
