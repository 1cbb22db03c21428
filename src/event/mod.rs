// ABOUTME: Append-only audit events that deploy history is projected from.
// ABOUTME: Events carry JSON payloads for the start, end, and extra phases.

mod handle;
pub mod permission;

pub use handle::EventHandle;
pub use permission::{AccessPolicy, ContextType, PermissionContext};

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::EventId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    App,
    Global,
}

/// What an event is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    #[serde(rename = "type")]
    pub kind: TargetType,
    pub value: String,
}

impl Target {
    pub fn app(name: impl Into<String>) -> Self {
        Self {
            kind: TargetType::App,
            value: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerType {
    User,
    Internal,
}

/// Who triggered an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(rename = "type")]
    pub kind: OwnerType,
    pub name: String,
}

impl Owner {
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            kind: OwnerType::User,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindType {
    Permission,
    Internal,
}

/// The operation an event records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kind {
    #[serde(rename = "type")]
    pub kind: KindType,
    pub name: String,
}

impl Kind {
    pub fn permission(name: impl Into<String>) -> Self {
        Self {
            kind: KindType::Permission,
            name: name.into(),
        }
    }
}

/// A stored audit event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub unique_id: EventId,
    pub target: Target,
    pub owner: Owner,
    pub kind: Kind,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub remove_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub allowed: AccessPolicy,
    #[serde(default)]
    pub start_custom_data: Option<serde_json::Value>,
    #[serde(default)]
    pub end_custom_data: Option<serde_json::Value>,
    #[serde(default)]
    pub other_custom_data: Option<serde_json::Value>,
}

/// Failure to read one of an event's payloads.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("event has no {0} payload")]
    Missing(&'static str),

    #[error("malformed {phase} payload: {source}")]
    Malformed {
        phase: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl Event {
    /// Start a new event for `target` at the current time.
    pub fn new(target: Target, owner: Owner, kind: Kind) -> Self {
        Self {
            unique_id: EventId::generate(),
            target,
            owner,
            kind,
            start_time: Utc::now(),
            end_time: None,
            error: String::new(),
            log: String::new(),
            remove_date: None,
            allowed: AccessPolicy::default(),
            start_custom_data: None,
            end_custom_data: None,
            other_custom_data: None,
        }
    }

    /// Time between start and end. Unfinished events have no duration.
    pub fn duration(&self) -> Duration {
        self.end_time
            .map(|end| end - self.start_time)
            .unwrap_or_else(Duration::zero)
    }

    pub fn start_data<T: DeserializeOwned>(&self) -> Result<T, PayloadError> {
        decode_payload("start", self.start_custom_data.as_ref())
    }

    pub fn end_data<T: DeserializeOwned>(&self) -> Result<T, PayloadError> {
        decode_payload("end", self.end_custom_data.as_ref())
    }

    pub fn other_data<T: DeserializeOwned>(&self) -> Result<T, PayloadError> {
        decode_payload("other", self.other_custom_data.as_ref())
    }
}

fn decode_payload<T: DeserializeOwned>(
    phase: &'static str,
    payload: Option<&serde_json::Value>,
) -> Result<T, PayloadError> {
    let payload = payload.ok_or(PayloadError::Missing(phase))?;
    T::deserialize(payload).map_err(|source| PayloadError::Malformed { phase, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn event() -> Event {
        Event::new(
            Target::app("myapp"),
            Owner::user("alice@example.com"),
            Kind::permission(permission::PERM_APP_DEPLOY),
        )
    }

    #[test]
    fn unfinished_event_has_zero_duration() {
        assert_eq!(event().duration(), Duration::zero());
    }

    #[test]
    fn duration_is_end_minus_start() {
        let mut evt = event();
        evt.end_time = Some(evt.start_time + Duration::seconds(42));
        assert_eq!(evt.duration(), Duration::seconds(42));
    }

    #[test]
    fn missing_payload_is_an_error() {
        let err = event().end_data::<HashMap<String, String>>().unwrap_err();
        assert!(matches!(err, PayloadError::Missing("end")));
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let mut evt = event();
        evt.end_custom_data = Some(json!(["not", "a", "map"]));
        let err = evt.end_data::<HashMap<String, String>>().unwrap_err();
        assert!(matches!(err, PayloadError::Malformed { phase: "end", .. }));
    }

    #[test]
    fn payload_decodes_into_requested_type() {
        let mut evt = event();
        evt.end_custom_data = Some(json!({"image": "registry/myapp:v2"}));
        let data: HashMap<String, String> = evt.end_data().unwrap();
        assert_eq!(data["image"], "registry/myapp:v2");
    }
}
