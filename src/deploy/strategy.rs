// ABOUTME: Deploy strategy selection based on provisioner capabilities.
// ABOUTME: Falls back from image to upload to archive deploys when a capability is missing.

use std::fmt;

use crate::provision::{ArchiveDeployer, ImageDeployer, Provisioner, UploadDeployer};

use super::{DeployError, DeployKind};

/// Provisioner operation used to carry out a deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStrategy {
    Rollback,
    ImageDeploy,
    UploadDeploy,
    ArchiveDeploy,
}

impl fmt::Display for DeployStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeployStrategy::Rollback => "rollback",
            DeployStrategy::ImageDeploy => "image deploy",
            DeployStrategy::UploadDeploy => "upload deploy",
            DeployStrategy::ArchiveDeploy => "archive deploy",
        };
        f.write_str(name)
    }
}

/// A selected strategy bound to the capability that implements it.
pub enum DeployRoute<'a> {
    Rollback,
    Image(&'a dyn ImageDeployer),
    Upload(&'a dyn UploadDeployer),
    Archive(&'a dyn ArchiveDeployer),
}

impl DeployRoute<'_> {
    pub fn strategy(&self) -> DeployStrategy {
        match self {
            DeployRoute::Rollback => DeployStrategy::Rollback,
            DeployRoute::Image(_) => DeployStrategy::ImageDeploy,
            DeployRoute::Upload(_) => DeployStrategy::UploadDeploy,
            DeployRoute::Archive(_) => DeployStrategy::ArchiveDeploy,
        }
    }
}

impl DeployStrategy {
    /// Pick the provisioner capability for a deploy of `kind`.
    ///
    /// Order:
    /// 1. Rollback always uses the provisioner's rollback
    /// 2. Image deploys use the image deployer when present
    /// 3. Image and upload deploys use the upload deployer when present
    /// 4. Everything else, including unmet image and upload deploys, uses
    ///    the archive deployer
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::MissingArchiveDeployer`] when the chain reaches
    /// the archive step and the provisioner cannot deploy archives.
    pub fn select(
        kind: DeployKind,
        provisioner: &dyn Provisioner,
    ) -> Result<DeployRoute<'_>, DeployError> {
        if kind == DeployKind::Rollback {
            return Ok(DeployRoute::Rollback);
        }

        if kind == DeployKind::Image
            && let Some(deployer) = provisioner.as_image_deployer()
        {
            return Ok(DeployRoute::Image(deployer));
        }

        if matches!(
            kind,
            DeployKind::Image | DeployKind::Upload | DeployKind::UploadBuild
        ) && let Some(deployer) = provisioner.as_upload_deployer()
        {
            return Ok(DeployRoute::Upload(deployer));
        }

        provisioner
            .as_archive_deployer()
            .map(DeployRoute::Archive)
            .ok_or_else(|| DeployError::MissingArchiveDeployer(provisioner.name().to_string()))
    }
}
