// ABOUTME: Configuration types and parsing for shipwright.yml.
// ABOUTME: Handles YAML parsing, env var interpolation, and config discovery.

mod deserialize;
mod env_value;
mod init;

pub use env_value::EnvValue;
pub use init::init_config;

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::app::App;
use crate::error::{Error, Result};
use crate::provision::{CATALOG_PROVISIONER, CatalogProvisioner, ProvisionerRegistry};
use crate::store::DataDir;

use deserialize::deserialize_catalog;

pub const CONFIG_FILENAME: &str = "shipwright.yml";
pub const CONFIG_FILENAME_ALT: &str = "shipwright.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".shipwright/config.yml";

pub const DEFAULT_DATA_DIR: &str = ".shipwright";
pub const DEFAULT_HISTORY_LIMIT: usize = 25;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding the JSON collections. Relative paths are resolved
    /// against the directory the config was found in.
    #[serde(default = "default_data_dir")]
    pub data_dir: EnvValue,

    #[serde(default)]
    pub history: HistoryConfig,

    /// Valid images per app, served by the catalog provisioner.
    #[serde(default, deserialize_with = "deserialize_catalog")]
    pub catalog: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Default number of deploys listed; 0 lists all of them.
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

fn default_data_dir() -> EnvValue {
    EnvValue::Literal(DEFAULT_DATA_DIR.to_string())
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("loading config from {}", path.display());
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    pub fn template() -> Self {
        Config {
            data_dir: default_data_dir(),
            history: HistoryConfig::default(),
            catalog: HashMap::new(),
        }
    }

    /// The data directory, resolved against `base`.
    pub fn data_dir(&self, base: &Path) -> Result<DataDir> {
        let path = PathBuf::from(self.data_dir.resolve()?);
        if path.is_absolute() {
            Ok(DataDir::new(path))
        } else {
            Ok(DataDir::new(base.join(path)))
        }
    }

    /// Registry answering image listings from the catalog.
    ///
    /// The catalog stands in for every provisioner `apps` reference, so
    /// history can be read without reaching the real backends.
    pub fn provisioners(&self, apps: &[App]) -> ProvisionerRegistry {
        let mut names: BTreeSet<&str> = apps.iter().map(|app| app.provisioner.as_str()).collect();
        names.insert(CATALOG_PROVISIONER);

        let mut registry = ProvisionerRegistry::new();
        for name in names {
            registry.register(Arc::new(CatalogProvisioner::named(
                name,
                self.catalog.clone(),
            )));
        }
        registry
    }
}
