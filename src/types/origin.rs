// ABOUTME: Deploy origin tags accepted by the platform.
// ABOUTME: A closed set: app-deploy, git, rollback, drag-and-drop, image.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Where a deploy request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    AppDeploy,
    Git,
    Rollback,
    DragAndDrop,
    Image,
}

#[derive(Debug, Error)]
#[error("invalid deploy origin: {0:?}")]
pub struct InvalidOrigin(pub String);

impl Origin {
    pub const ALL: [Origin; 5] = [
        Origin::AppDeploy,
        Origin::Git,
        Origin::Rollback,
        Origin::DragAndDrop,
        Origin::Image,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::AppDeploy => "app-deploy",
            Origin::Git => "git",
            Origin::Rollback => "rollback",
            Origin::DragAndDrop => "drag-and-drop",
            Origin::Image => "image",
        }
    }
}

impl FromStr for Origin {
    type Err = InvalidOrigin;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Origin::ALL
            .into_iter()
            .find(|origin| origin.as_str() == s)
            .ok_or_else(|| InvalidOrigin(s.to_string()))
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `origin` is one of the accepted origin tags.
pub fn validate_origin(origin: &str) -> bool {
    origin.parse::<Origin>().is_ok()
}
