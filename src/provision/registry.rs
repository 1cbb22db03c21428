// ABOUTME: Lookup table from provisioner names to backends.
// ABOUTME: Apps reference their provisioner by name.

use std::collections::HashMap;
use std::sync::Arc;

use super::{ProvisionError, Provisioner};
use crate::app::App;

#[derive(Default, Clone)]
pub struct ProvisionerRegistry {
    provisioners: HashMap<String, Arc<dyn Provisioner>>,
}

impl std::fmt::Debug for ProvisionerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.provisioners.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ProvisionerRegistry")
            .field("provisioners", &names)
            .finish()
    }
}

impl ProvisionerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provisioner under its own name, replacing any previous one.
    pub fn register(&mut self, provisioner: Arc<dyn Provisioner>) {
        self.provisioners
            .insert(provisioner.name().to_string(), provisioner);
    }

    pub fn with(mut self, provisioner: Arc<dyn Provisioner>) -> Self {
        self.register(provisioner);
        self
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Provisioner>, ProvisionError> {
        self.provisioners
            .get(name)
            .cloned()
            .ok_or_else(|| ProvisionError::NotRegistered(name.to_string()))
    }

    /// The provisioner responsible for `app`.
    pub fn for_app(&self, app: &App) -> Result<Arc<dyn Provisioner>, ProvisionError> {
        self.get(&app.provisioner)
    }
}
