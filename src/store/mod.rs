// ABOUTME: Storage interfaces for apps, events, and legacy deploy rows.
// ABOUTME: Provides in-memory implementations and a JSON data directory.

mod error;
pub mod file;
mod memory;

pub use error::StoreError;
pub use file::DataDir;
pub use memory::{MemoryAppStore, MemoryEventStore, MemoryLegacyDeploys};

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::app::{App, AppFilter};
use crate::event::{Event, KindType, TargetType};
use crate::migrate::LegacyDeploy;
use crate::types::{AppName, EventId};

/// Application records.
#[async_trait]
pub trait AppStore: Send + Sync {
    async fn get_by_name(&self, name: &AppName) -> Result<App, StoreError>;

    async fn list(&self, filter: &AppFilter) -> Result<Vec<App>, StoreError>;

    /// Bump the deploy counter, returning the new count.
    async fn increment_deploys(&self, name: &AppName) -> Result<u64, StoreError>;

    async fn set_update_platform(&self, name: &AppName, value: bool) -> Result<(), StoreError>;
}

/// Query over stored events. Unset criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub target_type: Option<TargetType>,
    /// Match events whose target value is any of these. Empty matches all.
    pub target_values: Vec<String>,
    pub kind_name: Option<String>,
    pub kind_type: Option<KindType>,
    pub skip: usize,
    /// Maximum number of events returned; 0 means no limit.
    pub limit: usize,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(kind) = self.target_type
            && event.target.kind != kind
        {
            return false;
        }
        if !self.target_values.is_empty() && !self.target_values.contains(&event.target.value) {
            return false;
        }
        if let Some(ref name) = self.kind_name
            && &event.kind.name != name
        {
            return false;
        }
        if let Some(kind) = self.kind_type
            && event.kind.kind != kind
        {
            return false;
        }
        true
    }
}

/// Append-only event log.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events matching `filter`, newest first, bounded by its skip and limit.
    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError>;

    async fn get_by_id(&self, id: &EventId) -> Result<Event, StoreError>;

    /// Insert an event keeping its id. Fails with [`StoreError::Duplicate`]
    /// when an event with the same id already exists.
    async fn insert(&self, event: Event) -> Result<(), StoreError>;
}

/// Source of rows from the legacy flat deploy collection.
pub trait LegacyDeploySource: Send + Sync {
    fn legacy_deploys(&self) -> BoxStream<'_, Result<LegacyDeploy, StoreError>>;
}
