// ABOUTME: Read-only provisioner backed by a static image catalog.
// ABOUTME: Answers image listings for history views; cannot deploy or roll back.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{ProvisionError, Provisioner};
use crate::app::App;
use crate::event::EventHandle;
use crate::types::ImageId;

pub const CATALOG_PROVISIONER: &str = "catalog";

/// Serves valid images per app from a fixed map.
#[derive(Debug, Clone, Default)]
pub struct CatalogProvisioner {
    name: String,
    images: HashMap<String, Vec<String>>,
}

impl CatalogProvisioner {
    pub fn new(images: HashMap<String, Vec<String>>) -> Self {
        Self::named(CATALOG_PROVISIONER, images)
    }

    /// A catalog registered under a custom name, so it can stand in for a
    /// provisioner the apps reference.
    pub fn named(name: impl Into<String>, images: HashMap<String, Vec<String>>) -> Self {
        Self {
            name: name.into(),
            images,
        }
    }
}

#[async_trait]
impl Provisioner for CatalogProvisioner {
    fn name(&self) -> &str {
        &self.name
    }

    async fn valid_app_images(&self, app: &str) -> Result<Vec<String>, ProvisionError> {
        Ok(self.images.get(app).cloned().unwrap_or_default())
    }

    async fn rollback(
        &self,
        _app: &App,
        _image: &str,
        _event: &EventHandle,
    ) -> Result<ImageId, ProvisionError> {
        Err(ProvisionError::Unsupported {
            provisioner: self.name.clone(),
            operation: "rollback",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_configured_images() {
        let catalog = CatalogProvisioner::new(HashMap::from([(
            "myapp".to_string(),
            vec!["registry/myapp:v1".to_string()],
        )]));
        assert_eq!(
            catalog.valid_app_images("myapp").await.unwrap(),
            vec!["registry/myapp:v1"]
        );
        assert!(catalog.valid_app_images("other").await.unwrap().is_empty());
    }

    #[test]
    fn advertises_no_deploy_capabilities() {
        let catalog = CatalogProvisioner::default();
        assert!(catalog.as_image_deployer().is_none());
        assert!(catalog.as_upload_deployer().is_none());
        assert!(catalog.as_archive_deployer().is_none());
    }
}
