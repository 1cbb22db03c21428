// ABOUTME: JSON data directory backing the command-line tool.
// ABOUTME: Loads apps, events, and legacy deploy rows into in-memory stores.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{MemoryAppStore, MemoryEventStore, MemoryLegacyDeploys, StoreError};

pub const APPS_FILE: &str = "apps.json";
pub const EVENTS_FILE: &str = "events.json";
pub const LEGACY_DEPLOYS_FILE: &str = "legacy-deploys.json";

/// A directory of JSON files, one array per collection.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load_apps(&self) -> Result<MemoryAppStore, StoreError> {
        Ok(MemoryAppStore::new(read_collection(&self.root.join(APPS_FILE))?))
    }

    pub fn load_events(&self) -> Result<MemoryEventStore, StoreError> {
        Ok(MemoryEventStore::new(read_collection(
            &self.root.join(EVENTS_FILE),
        )?))
    }

    pub fn save_events(&self, store: &MemoryEventStore) -> Result<(), StoreError> {
        write_collection(&self.root.join(EVENTS_FILE), &store.events())
    }

    pub fn load_legacy_deploys(&self) -> Result<MemoryLegacyDeploys, StoreError> {
        Ok(MemoryLegacyDeploys::new(read_collection(
            &self.root.join(LEGACY_DEPLOYS_FILE),
        )?))
    }
}

/// Read a JSON array. A missing file is an empty collection.
fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    if !path.exists() {
        tracing::debug!("{} does not exist, treating as empty", path.display());
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_collection<T: Serialize>(path: &Path, items: &[T]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(items)?;
    std::fs::write(path, json)?;
    Ok(())
}
