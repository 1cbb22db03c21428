// ABOUTME: In-memory store implementations guarded by parking_lot locks.
// ABOUTME: Used by tests and as the working set behind the JSON data directory.

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use parking_lot::RwLock;

use super::{AppStore, EventFilter, EventStore, LegacyDeploySource, StoreError};
use crate::app::{App, AppFilter};
use crate::event::Event;
use crate::migrate::LegacyDeploy;
use crate::types::{AppName, EventId};

#[derive(Debug, Default)]
pub struct MemoryAppStore {
    apps: RwLock<BTreeMap<AppName, App>>,
}

impl MemoryAppStore {
    pub fn new(apps: impl IntoIterator<Item = App>) -> Self {
        let apps = apps
            .into_iter()
            .map(|app| (app.name.clone(), app))
            .collect();
        Self {
            apps: RwLock::new(apps),
        }
    }

    /// Add or replace an app.
    pub fn insert(&self, app: App) {
        self.apps.write().insert(app.name.clone(), app);
    }

    pub fn remove(&self, name: &AppName) -> Option<App> {
        self.apps.write().remove(name)
    }

    pub fn apps(&self) -> Vec<App> {
        self.apps.read().values().cloned().collect()
    }
}

#[async_trait]
impl AppStore for MemoryAppStore {
    async fn get_by_name(&self, name: &AppName) -> Result<App, StoreError> {
        self.apps
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("app {name}")))
    }

    async fn list(&self, filter: &AppFilter) -> Result<Vec<App>, StoreError> {
        Ok(self
            .apps
            .read()
            .values()
            .filter(|app| filter.matches(app))
            .cloned()
            .collect())
    }

    async fn increment_deploys(&self, name: &AppName) -> Result<u64, StoreError> {
        let mut apps = self.apps.write();
        let app = apps
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound(format!("app {name}")))?;
        app.deploys += 1;
        Ok(app.deploys)
    }

    async fn set_update_platform(&self, name: &AppName, value: bool) -> Result<(), StoreError> {
        let mut apps = self.apps.write();
        let app = apps
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound(format!("app {name}")))?;
        app.update_platform = value;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: RwLock<Vec<Event>>,
}

impl MemoryEventStore {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: RwLock::new(events.into_iter().collect()),
        }
    }

    /// All stored events in insertion order.
    pub fn events(&self) -> Vec<Event> {
        self.events.read().clone()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        let mut matching: Vec<Event> = self
            .events
            .read()
            .iter()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.start_time.cmp(&a.start_time));

        let limit = if filter.limit == 0 {
            usize::MAX
        } else {
            filter.limit
        };
        Ok(matching.into_iter().skip(filter.skip).take(limit).collect())
    }

    async fn get_by_id(&self, id: &EventId) -> Result<Event, StoreError> {
        self.events
            .read()
            .iter()
            .find(|event| event.unique_id.same_event(id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("event {id}")))
    }

    async fn insert(&self, event: Event) -> Result<(), StoreError> {
        let mut events = self.events.write();
        if events.iter().any(|e| e.unique_id.same_event(&event.unique_id)) {
            return Err(StoreError::Duplicate(event.unique_id.to_string()));
        }
        events.push(event);
        Ok(())
    }
}

/// A fixed list of legacy deploy rows.
#[derive(Debug, Default)]
pub struct MemoryLegacyDeploys {
    rows: Vec<LegacyDeploy>,
}

impl MemoryLegacyDeploys {
    pub fn new(rows: Vec<LegacyDeploy>) -> Self {
        Self { rows }
    }
}

impl LegacyDeploySource for MemoryLegacyDeploys {
    fn legacy_deploys(&self) -> BoxStream<'_, Result<LegacyDeploy, StoreError>> {
        stream::iter(self.rows.iter().cloned().map(Ok)).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Kind, Owner, Target};
    use chrono::{Duration, Utc};

    fn event_for(app: &str, minutes_ago: i64) -> Event {
        let mut event = Event::new(
            Target::app(app),
            Owner::user("alice"),
            Kind::permission("app.deploy"),
        );
        event.start_time = Utc::now() - Duration::minutes(minutes_ago);
        event
    }

    #[tokio::test]
    async fn list_is_newest_first_with_skip_and_limit() {
        let store = MemoryEventStore::new((0..5).map(|i| event_for("myapp", i)));
        let all = store.list(&EventFilter::default()).await.unwrap();
        assert_eq!(all.len(), 5);
        assert!(all.windows(2).all(|w| w[0].start_time >= w[1].start_time));

        let page = store
            .list(&EventFilter {
                skip: 1,
                limit: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].unique_id, all[1].unique_id);
        assert_eq!(page[1].unique_id, all[2].unique_id);
    }

    #[tokio::test]
    async fn list_filters_by_target_values() {
        let store = MemoryEventStore::new([event_for("a", 1), event_for("b", 2)]);
        let filter = EventFilter {
            target_values: vec!["b".to_string()],
            ..Default::default()
        };
        let events = store.list(&filter).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].target.value, "b");
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let event = event_for("myapp", 0);
        let store = MemoryEventStore::default();
        store.insert(event.clone()).await.unwrap();
        let err = store.insert(event).await.unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn app_counter_and_flag_updates() {
        let name = AppName::new("myapp").unwrap();
        let store = MemoryAppStore::new([App::new(name.clone(), "docker")]);

        assert_eq!(store.increment_deploys(&name).await.unwrap(), 1);
        assert_eq!(store.increment_deploys(&name).await.unwrap(), 2);
        store.set_update_platform(&name, true).await.unwrap();

        let app = store.get_by_name(&name).await.unwrap();
        assert_eq!(app.deploys, 2);
        assert!(app.update_platform);
    }

    #[tokio::test]
    async fn unknown_app_is_not_found() {
        let store = MemoryAppStore::default();
        let err = store
            .get_by_name(&AppName::new("ghost").unwrap())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
