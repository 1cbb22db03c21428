// ABOUTME: Permission names and access policies attached to audit events.
// ABOUTME: Builds the read policy scoped to an app's teams, name, and pool.

use serde::{Deserialize, Serialize};

use crate::app::App;

/// Permission required to deploy an app.
pub const PERM_APP_DEPLOY: &str = "app.deploy";

/// Permission required to read an app's events.
pub const PERM_APP_READ_EVENTS: &str = "app.read.events";

/// Scope a permission context applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextType {
    Global,
    Team,
    App,
    Pool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionContext {
    #[serde(rename = "type")]
    pub kind: ContextType,
    pub value: String,
}

impl PermissionContext {
    pub fn new(kind: ContextType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Who may read an event: a permission scheme plus the contexts it is
/// granted in. No contexts means only holders of the scheme in the global
/// context can see it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    pub scheme: String,
    #[serde(default)]
    pub contexts: Vec<PermissionContext>,
}

impl AccessPolicy {
    pub fn allowed(scheme: &str, contexts: Vec<PermissionContext>) -> Self {
        Self {
            scheme: scheme.to_string(),
            contexts,
        }
    }

    /// Read-events policy for an app's deploy history.
    ///
    /// Falls back to an unscoped policy when the app no longer exists.
    pub fn for_app_events(app: Option<&App>) -> Self {
        let Some(app) = app else {
            return Self::allowed(PERM_APP_READ_EVENTS, Vec::new());
        };

        let mut contexts: Vec<PermissionContext> = app
            .teams
            .iter()
            .map(|team| PermissionContext::new(ContextType::Team, team))
            .collect();
        contexts.push(PermissionContext::new(ContextType::App, app.name.as_str()));
        contexts.push(PermissionContext::new(ContextType::Pool, &app.pool));

        Self::allowed(PERM_APP_READ_EVENTS, contexts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AppName;

    #[test]
    fn app_policy_scopes_teams_app_and_pool() {
        let app = App::new(AppName::new("myapp").unwrap(), "docker")
            .with_pool("prod")
            .with_teams(["core"]);

        let policy = AccessPolicy::for_app_events(Some(&app));
        assert_eq!(policy.scheme, PERM_APP_READ_EVENTS);
        assert_eq!(
            policy.contexts,
            vec![
                PermissionContext::new(ContextType::Team, "core"),
                PermissionContext::new(ContextType::App, "myapp"),
                PermissionContext::new(ContextType::Pool, "prod"),
            ]
        );
    }

    #[test]
    fn missing_app_policy_has_no_contexts() {
        let policy = AccessPolicy::for_app_events(None);
        assert_eq!(policy.scheme, PERM_APP_READ_EVENTS);
        assert!(policy.contexts.is_empty());
    }
}
