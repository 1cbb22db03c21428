// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates shipwright.yml template files.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, Config};

/// Write a template config into `dir`, returning its path.
pub fn init_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let yaml = generate_template_yaml(&Config::template());
    std::fs::write(&config_path, yaml)?;

    Ok(config_path)
}

fn generate_template_yaml(config: &Config) -> String {
    let data_dir = match &config.data_dir {
        super::EnvValue::Literal(path) => path.clone(),
        super::EnvValue::FromEnv { default, .. } => default.clone().unwrap_or_default(),
    };
    format!(
        r#"# Directory with apps.json, events.json and legacy-deploys.json
data_dir: {}
# Or read it from the environment:
# data_dir:
#   env: SHIPWRIGHT_DATA_DIR
#   default: {}

history:
  # Deploys listed when --limit is not given (0 lists all)
  limit: {}

# Images each app can still roll back to
catalog:
  # my-app:
  #   - registry.example.com/my-app:v1
  #   - registry.example.com/my-app:v2
"#,
        data_dir, data_dir, config.history.limit
    )
}
