// ABOUTME: Canonical classification of deploy requests.
// ABOUTME: Fixed precedence: rollback, image, upload, git, then archive URL.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::DeployRequest;

/// How a deploy request delivers the new version of an app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeployKind {
    Rollback,
    Image,
    Upload,
    UploadBuild,
    Git,
    ArchiveUrl,
}

impl DeployKind {
    /// Classify a request. The first matching rule wins:
    ///
    /// 1. rollback flag set
    /// 2. image reference present
    /// 3. upload present (build-only selects [`DeployKind::UploadBuild`])
    /// 4. commit present
    /// 5. anything else is an archive URL deploy, even with an empty URL
    ///
    /// This is precedence, not validation: a request carrying both a commit
    /// and an image is an image deploy.
    pub fn resolve(request: &DeployRequest) -> Self {
        if request.rollback {
            return DeployKind::Rollback;
        }
        if !request.image.is_empty() {
            return DeployKind::Image;
        }
        if request.file.is_some() {
            return if request.build_only {
                DeployKind::UploadBuild
            } else {
                DeployKind::Upload
            };
        }
        if !request.commit.is_empty() {
            return DeployKind::Git;
        }
        DeployKind::ArchiveUrl
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeployKind::Rollback => "rollback",
            DeployKind::Image => "image",
            DeployKind::Upload => "upload",
            DeployKind::UploadBuild => "upload-build",
            DeployKind::Git => "git",
            DeployKind::ArchiveUrl => "archive-url",
        }
    }
}

impl fmt::Display for DeployKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
