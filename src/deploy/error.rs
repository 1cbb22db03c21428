// ABOUTME: Error types for deploy dispatch.
// ABOUTME: Provisioner failures pass through verbatim; side-effect failures never appear here.

use crate::provision::ProvisionError;

/// Errors that can fail a deploy.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The request carries no audit event. A caller bug, not retryable.
    #[error("missing event in deploy request")]
    MissingEvent,

    /// No valid image matches the requested rollback target.
    #[error("invalid version: {0:?}")]
    InvalidRollbackTarget(String),

    /// The provisioner cannot even deploy archives, so nothing can run.
    #[error("provisioner {0} does not support archive deploys")]
    MissingArchiveDeployer(String),

    /// Failure reported by the provisioner.
    #[error(transparent)]
    Provision(#[from] ProvisionError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    /// Caller supplied an incomplete request.
    Precondition,
    /// The user asked for something that cannot be done.
    InvalidInput,
    /// Platform misconfiguration.
    Configuration,
    /// The provisioner failed to run the deploy.
    Dispatch,
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::MissingEvent => DeployErrorKind::Precondition,
            DeployError::InvalidRollbackTarget(_) => DeployErrorKind::InvalidInput,
            DeployError::MissingArchiveDeployer(_)
            | DeployError::Provision(ProvisionError::NotRegistered(_)) => {
                DeployErrorKind::Configuration
            }
            DeployError::Provision(_) => DeployErrorKind::Dispatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provision_errors_display_verbatim() {
        let source = ProvisionError::DeployFailed("build exploded".to_string());
        let expected = source.to_string();
        let err = DeployError::from(source);
        assert_eq!(err.to_string(), expected);
        assert_eq!(err.kind(), DeployErrorKind::Dispatch);
    }

    #[test]
    fn kinds() {
        assert_eq!(DeployError::MissingEvent.kind(), DeployErrorKind::Precondition);
        assert_eq!(
            DeployError::InvalidRollbackTarget("v9".to_string()).kind(),
            DeployErrorKind::InvalidInput
        );
        assert_eq!(
            DeployError::MissingArchiveDeployer("x".to_string()).kind(),
            DeployErrorKind::Configuration
        );
        assert_eq!(
            DeployError::from(ProvisionError::NotRegistered("x".to_string())).kind(),
            DeployErrorKind::Configuration
        );
    }

    #[test]
    fn invalid_target_quotes_input() {
        let err = DeployError::InvalidRollbackTarget("v9".to_string());
        assert_eq!(err.to_string(), "invalid version: \"v9\"");
    }
}
