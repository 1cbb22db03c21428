// ABOUTME: Application records as seen by the deploy engine.
// ABOUTME: Includes the filter used to select apps for history listings.

use serde::{Deserialize, Serialize};

use crate::types::AppName;

/// An application known to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    pub name: AppName,
    #[serde(default)]
    pub pool: String,
    #[serde(default)]
    pub teams: Vec<String>,
    /// Registry key of the provisioner that runs this app.
    pub provisioner: String,
    #[serde(default)]
    pub deploys: u64,
    /// Set when the app's platform changed and the next deploy should pick it up.
    #[serde(default)]
    pub update_platform: bool,
}

impl App {
    pub fn new(name: AppName, provisioner: impl Into<String>) -> Self {
        Self {
            name,
            pool: String::new(),
            teams: Vec::new(),
            provisioner: provisioner.into(),
            deploys: 0,
            update_platform: false,
        }
    }

    pub fn with_pool(mut self, pool: impl Into<String>) -> Self {
        self.pool = pool.into();
        self
    }

    pub fn with_teams<I, S>(mut self, teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.teams = teams.into_iter().map(Into::into).collect();
        self
    }
}

/// Selects applications. Empty criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct AppFilter {
    pub names: Vec<AppName>,
    pub pool: Option<String>,
    pub team: Option<String>,
}

impl AppFilter {
    pub fn for_app(name: AppName) -> Self {
        Self {
            names: vec![name],
            ..Default::default()
        }
    }

    pub fn matches(&self, app: &App) -> bool {
        if !self.names.is_empty() && !self.names.contains(&app.name) {
            return false;
        }
        if let Some(ref pool) = self.pool
            && &app.pool != pool
        {
            return false;
        }
        if let Some(ref team) = self.team
            && !app.teams.contains(team)
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(name: &str) -> App {
        App::new(AppName::new(name).unwrap(), "docker")
            .with_pool("prod")
            .with_teams(["core", "web"])
    }

    #[test]
    fn empty_filter_matches_all() {
        assert!(AppFilter::default().matches(&app("myapp")));
    }

    #[test]
    fn filter_by_name() {
        let filter = AppFilter::for_app(AppName::new("other").unwrap());
        assert!(!filter.matches(&app("myapp")));
        assert!(filter.matches(&app("other")));
    }

    #[test]
    fn filter_by_pool_and_team() {
        let filter = AppFilter {
            pool: Some("prod".to_string()),
            team: Some("web".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&app("myapp")));

        let filter = AppFilter {
            team: Some("billing".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&app("myapp")));
    }
}
