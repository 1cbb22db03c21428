// ABOUTME: Diagnostics accumulator for non-fatal warnings during deploys and migrations.
// ABOUTME: Collects failures that shouldn't fail the operation but should be shown to users.

/// Collects non-fatal warnings.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }
}

/// A non-fatal warning.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// The app's deploy counter could not be incremented.
    pub fn deploy_counter(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::DeployCounter,
            message: message.into(),
        }
    }

    /// The app's pending platform update flag could not be cleared.
    pub fn platform_flag(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::PlatformFlag,
            message: message.into(),
        }
    }
}

/// Categories of warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Deploy succeeded but the counter was not bumped.
    DeployCounter,
    /// Deploy succeeded but `update_platform` is still set.
    PlatformFlag,
}
