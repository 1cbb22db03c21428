// ABOUTME: Errors reported by provisioners and the provisioner registry.
// ABOUTME: Deploy failures from a backend pass through to callers unchanged.

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("provisioner not registered: {0}")]
    NotRegistered(String),

    #[error("operation not supported by provisioner {provisioner}: {operation}")]
    Unsupported {
        provisioner: String,
        operation: &'static str,
    },

    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("deploy failed: {0}")]
    DeployFailed(String),

    #[error("provisioner backend error: {0}")]
    Backend(String),
}
