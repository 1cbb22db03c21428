// ABOUTME: Deploy history read from the event log.
// ABOUTME: Lists deploys of matching apps and fetches single deploy records.

pub mod decode;
mod record;

pub use record::{DeployRecord, Detail, project};

use std::sync::Arc;

use thiserror::Error;

use crate::app::AppFilter;
use crate::event::permission::PERM_APP_DEPLOY;
use crate::event::{KindType, TargetType};
use crate::image_set::find_valid_images;
use crate::provision::{ProvisionError, ProvisionerRegistry};
use crate::store::{AppStore, EventFilter, EventStore, StoreError};
use crate::types::{EventId, ParseEventIdError};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error(transparent)]
    InvalidDeployId(#[from] ParseEventIdError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),
}

impl HistoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, HistoryError::Store(e) if e.is_not_found())
    }
}

/// Read side of deploys.
pub struct DeployHistory {
    apps: Arc<dyn AppStore>,
    events: Arc<dyn EventStore>,
    provisioners: ProvisionerRegistry,
}

impl DeployHistory {
    pub fn new(
        apps: Arc<dyn AppStore>,
        events: Arc<dyn EventStore>,
        provisioners: ProvisionerRegistry,
    ) -> Self {
        Self {
            apps,
            events,
            provisioners,
        }
    }

    /// Deploys of the apps matching `filter`, newest first.
    ///
    /// `skip` and `limit` apply to events, with a `limit` of 0 meaning no
    /// limit. Records are summaries; versioned images are shortened and
    /// flagged as rollback targets when the app's provisioner still has them.
    pub async fn list(
        &self,
        filter: &AppFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<DeployRecord>, HistoryError> {
        let apps = self.apps.list(filter).await?;
        if apps.is_empty() {
            tracing::debug!("no apps match {:?}", filter);
            return Ok(Vec::new());
        }

        let events = self
            .events
            .list(&EventFilter {
                target_type: Some(TargetType::App),
                target_values: apps.iter().map(|app| app.name.to_string()).collect(),
                kind_name: Some(PERM_APP_DEPLOY.to_string()),
                kind_type: Some(KindType::Permission),
                skip,
                limit,
            })
            .await?;

        let images = find_valid_images(&apps, &self.provisioners).await?;
        tracing::debug!(
            "projecting {} deploy events of {} apps",
            events.len(),
            apps.len()
        );

        Ok(events
            .iter()
            .map(|event| project(event, Some(&images), Detail::Summary))
            .collect())
    }

    /// Full record of one deploy. The image is shown as recorded.
    pub async fn get(&self, id: &str) -> Result<DeployRecord, HistoryError> {
        let id = EventId::parse(id)?;
        let event = self.events.get_by_id(&id).await?;
        Ok(project(&event, None, Detail::Full))
    }
}
