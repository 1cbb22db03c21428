// ABOUTME: Loads the config and data directory a command operates on.
// ABOUTME: Wires the JSON collections into stores and the provisioner registry.

use std::path::Path;
use std::sync::Arc;

use shipwright::config::Config;
use shipwright::error::Result;
use shipwright::history::DeployHistory;
use shipwright::store::{DataDir, MemoryAppStore, MemoryEventStore};

pub struct Workspace {
    pub config: Config,
    pub data: DataDir,
}

impl Workspace {
    pub fn discover(dir: &Path) -> Result<Self> {
        let config = Config::discover(dir)?;
        let data = config.data_dir(dir)?;
        tracing::debug!("using data directory {}", data.root().display());
        Ok(Self { config, data })
    }

    pub fn apps(&self) -> Result<Arc<MemoryAppStore>> {
        Ok(Arc::new(self.data.load_apps()?))
    }

    pub fn events(&self) -> Result<Arc<MemoryEventStore>> {
        Ok(Arc::new(self.data.load_events()?))
    }

    pub fn history(&self) -> Result<DeployHistory> {
        let apps = self.apps()?;
        let provisioners = self.config.provisioners(&apps.apps());
        Ok(DeployHistory::new(apps, self.events()?, provisioners))
    }
}
