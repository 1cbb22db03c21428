// ABOUTME: Capability traits for provisioners.
// ABOUTME: Every backend can roll back; image, upload, and archive deploys are opt-in.

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::ProvisionError;
use crate::app::App;
use crate::event::EventHandle;
use crate::types::ImageId;

/// An infrastructure backend that runs applications.
///
/// Only rollback and image listing are mandatory. Optional deploy strategies
/// are advertised through the `as_*` accessors, which return `None` unless
/// the backend overrides them.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Registry key of this provisioner.
    fn name(&self) -> &str;

    /// Images of `app` that can still be rolled back to.
    async fn valid_app_images(&self, app: &str) -> Result<Vec<String>, ProvisionError>;

    /// Re-activate a previously built image.
    async fn rollback(
        &self,
        app: &App,
        image: &str,
        event: &EventHandle,
    ) -> Result<ImageId, ProvisionError>;

    fn as_image_deployer(&self) -> Option<&dyn ImageDeployer> {
        None
    }

    fn as_upload_deployer(&self) -> Option<&dyn UploadDeployer> {
        None
    }

    fn as_archive_deployer(&self) -> Option<&dyn ArchiveDeployer> {
        None
    }
}

/// Deploys a prebuilt container image.
#[async_trait]
pub trait ImageDeployer: Send + Sync {
    async fn image_deploy(
        &self,
        app: &App,
        image: &str,
        event: &EventHandle,
    ) -> Result<ImageId, ProvisionError>;
}

/// Deploys a raw uploaded file, optionally building without activating it.
#[async_trait]
pub trait UploadDeployer: Send + Sync {
    async fn upload_deploy(
        &self,
        app: &App,
        upload: Upload,
        build_only: bool,
        event: &EventHandle,
    ) -> Result<ImageId, ProvisionError>;
}

/// Deploys an archive fetched from a URL. The baseline strategy.
#[async_trait]
pub trait ArchiveDeployer: Send + Sync {
    async fn archive_deploy(
        &self,
        app: &App,
        url: &str,
        event: &EventHandle,
    ) -> Result<ImageId, ProvisionError>;
}

/// An uploaded file stream and its declared size in bytes.
pub struct Upload {
    pub reader: Pin<Box<dyn AsyncRead + Send>>,
    pub size: u64,
}

impl Upload {
    pub fn new(reader: impl AsyncRead + Send + 'static, size: u64) -> Self {
        Self {
            reader: Box::pin(reader),
            size,
        }
    }

    /// A zero-length upload.
    pub fn empty() -> Self {
        Self::new(tokio::io::empty(), 0)
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload").field("size", &self.size).finish()
    }
}
