// ABOUTME: Deploy request assembled by callers and consumed by one deploy.
// ABOUTME: Also defines the payloads persisted on the deploy event.

use std::fmt;
use std::io::Write;

use serde::{Deserialize, Serialize};

use super::DeployKind;
use crate::app::App;
use crate::event::permission::PERM_APP_DEPLOY;
use crate::event::{AccessPolicy, Event, EventHandle, Kind, Owner, Target};
use crate::provision::Upload;
use crate::types::Origin;

/// A single deploy attempt. Exactly one source (commit, archive URL, image,
/// upload) is expected to be set, or the rollback flag with a target image.
pub struct DeployRequest {
    pub app: App,
    pub commit: String,
    pub archive_url: String,
    pub image: String,
    pub file: Option<Upload>,
    pub rollback: bool,
    /// Build the upload without activating it.
    pub build_only: bool,
    pub user: String,
    pub origin: Option<Origin>,
    pub message: String,
    /// Receives streamed deploy output. Never persisted.
    pub output: Option<Box<dyn Write + Send>>,
    /// Audit event recording this deploy. Required.
    pub event: Option<EventHandle>,
}

impl DeployRequest {
    pub fn new(app: App) -> Self {
        Self {
            app,
            commit: String::new(),
            archive_url: String::new(),
            image: String::new(),
            file: None,
            rollback: false,
            build_only: false,
            user: String::new(),
            origin: None,
            message: String::new(),
            output: None,
            event: None,
        }
    }

    pub fn with_event(mut self, event: EventHandle) -> Self {
        self.event = Some(event);
        self
    }

    pub fn with_output(mut self, output: Box<dyn Write + Send>) -> Self {
        self.output = Some(output);
        self
    }

    /// Open the audit event for this request and attach it.
    ///
    /// The event targets the app, is owned by the requesting user, and
    /// carries the start payload plus the app's read policy.
    pub fn open_event(&mut self) -> serde_json::Result<EventHandle> {
        let kind = DeployKind::resolve(self);
        let mut event = Event::new(
            Target::app(self.app.name.as_str()),
            Owner::user(self.user.as_str()),
            Kind::permission(PERM_APP_DEPLOY),
        );
        event.allowed = AccessPolicy::for_app_events(Some(&self.app));

        let handle = EventHandle::new(event);
        handle.set_start_data(&self.start_payload(kind))?;
        self.event = Some(handle.clone());
        Ok(handle)
    }

    /// The persisted subset of this request, stored as the event's start payload.
    pub fn start_payload(&self, kind: DeployKind) -> StartPayload {
        StartPayload {
            app: self.app.name.to_string(),
            commit: self.commit.clone(),
            archive_url: self.archive_url.clone(),
            image: self.image.clone(),
            file_size: self.file.as_ref().map(|f| f.size).unwrap_or_default(),
            user: self.user.clone(),
            origin: self.origin.map(|o| o.to_string()).unwrap_or_default(),
            rollback: self.rollback,
            build: self.build_only,
            message: self.message.clone(),
            kind: Some(kind),
        }
    }
}

impl fmt::Debug for DeployRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployRequest")
            .field("app", &self.app.name)
            .field("commit", &self.commit)
            .field("archive_url", &self.archive_url)
            .field("image", &self.image)
            .field("file", &self.file)
            .field("rollback", &self.rollback)
            .field("build_only", &self.build_only)
            .field("user", &self.user)
            .field("origin", &self.origin)
            .field("message", &self.message)
            .field("has_output", &self.output.is_some())
            .field("event", &self.event)
            .finish()
    }
}

/// Start-phase payload of a deploy event.
///
/// Every field defaults when absent so that partially recorded or migrated
/// events still decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartPayload {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub app: String,
    pub commit: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub archive_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub file_size: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user: String,
    pub origin: String,
    #[serde(skip_serializing_if = "is_false")]
    pub rollback: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub build: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<DeployKind>,
}

/// End-phase payload of a deploy event: the image that ended up running.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndPayload {
    pub image: String,
}

/// Extra payload of a deploy event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherPayload {
    /// Code diff shipped with the deploy.
    pub diff: String,
}

fn is_false(value: &bool) -> bool {
    !value
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AppName;
    use serde_json::json;

    #[test]
    fn start_payload_captures_request_fields() {
        let mut req = DeployRequest::new(App::new(AppName::new("myapp").unwrap(), "docker"));
        req.commit = "abc123".to_string();
        req.origin = Some(Origin::Git);
        req.user = "alice".to_string();

        let payload = req.start_payload(DeployKind::Git);
        assert_eq!(payload.app, "myapp");
        assert_eq!(payload.commit, "abc123");
        assert_eq!(payload.origin, "git");
        assert_eq!(payload.kind, Some(DeployKind::Git));
    }

    #[test]
    fn open_event_records_start_payload() {
        let app = App::new(AppName::new("myapp").unwrap(), "docker").with_teams(["ops"]);
        let mut req = DeployRequest::new(app);
        req.image = "registry/myapp:v2".to_string();
        req.user = "bob".to_string();

        let handle = req.open_event().unwrap();
        assert!(req.event.is_some());

        let event = handle.snapshot();
        assert_eq!(event.kind.name, PERM_APP_DEPLOY);
        assert_eq!(event.target.value, "myapp");
        assert_eq!(event.owner.name, "bob");
        assert_eq!(event.allowed.contexts.len(), 3);

        let payload: StartPayload = event.start_data().unwrap();
        assert_eq!(payload.image, "registry/myapp:v2");
        assert_eq!(payload.kind, Some(DeployKind::Image));
    }

    #[test]
    fn minimal_payload_serializes_commit_and_origin_only() {
        let payload = StartPayload {
            commit: "abc".to_string(),
            origin: "git".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, json!({"commit": "abc", "origin": "git"}));
    }

    #[test]
    fn payload_decodes_with_missing_fields() {
        let payload: StartPayload = serde_json::from_value(json!({"origin": "image"})).unwrap();
        assert_eq!(payload.origin, "image");
        assert!(payload.commit.is_empty());
    }
}
