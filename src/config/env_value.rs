// ABOUTME: Config values that may be read from the environment.
// ABOUTME: Lets shipwright.yml point the data directory at a deploy-host variable.

use crate::error::{Error, Result};
use serde::Deserialize;

/// A config string written inline or looked up in the environment.
///
/// ```yaml
/// data_dir: /var/lib/shipwright
/// # or
/// data_dir:
///   env: SHIPWRIGHT_DATA_DIR
///   default: .shipwright
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        /// Used when `var` is unset or not valid unicode.
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    /// The effective value at the time of the call.
    ///
    /// # Errors
    ///
    /// [`Error::MissingEnvVar`] when the variable is unset and no default
    /// was configured.
    pub fn resolve(&self) -> Result<String> {
        let (var, default) = match self {
            EnvValue::Literal(value) => return Ok(value.clone()),
            EnvValue::FromEnv { var, default } => (var, default),
        };

        match (std::env::var(var), default) {
            (Ok(value), _) => Ok(value),
            (Err(_), Some(fallback)) => {
                tracing::debug!("{} not set, using default {:?}", var, fallback);
                Ok(fallback.clone())
            }
            (Err(_), None) => Err(Error::MissingEnvVar(var.clone())),
        }
    }
}
