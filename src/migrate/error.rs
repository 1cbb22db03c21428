// ABOUTME: Migration error types with SNAFU pattern.
// ABOUTME: Every variant aborts the migration; duplicates are not errors.

use snafu::Snafu;

use crate::store::StoreError;
use crate::types::EventId;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum MigrationError {
    #[snafu(display("failed to read legacy deploys: {source}"))]
    Source { source: StoreError },

    #[snafu(display("failed to encode payloads of deploy {id}: {source}"))]
    Payload {
        id: EventId,
        source: serde_json::Error,
    },

    #[snafu(display("failed to insert event for deploy {id}: {source}"))]
    Insert { id: EventId, source: StoreError },
}

impl MigrationError {
    /// Id of the legacy row being migrated when the error happened, if any.
    pub fn deploy_id(&self) -> Option<&EventId> {
        match self {
            MigrationError::Source { .. } => None,
            MigrationError::Payload { id, .. } | MigrationError::Insert { id, .. } => Some(id),
        }
    }
}
