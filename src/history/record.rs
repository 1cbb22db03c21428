// ABOUTME: Projection of deploy events into deploy history records.
// ABOUTME: Records are computed on read and never stored.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::decode::best_effort;
use crate::deploy::{EndPayload, OtherPayload, StartPayload};
use crate::event::Event;
use crate::image_set::ImageSet;
use crate::types::{EventId, version_suffix};

/// How much of an event a record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detail {
    /// Listing view: no log or diff.
    Summary,
    /// Single-record view with log and diff.
    Full,
}

/// One deploy as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployRecord {
    pub id: EventId,
    pub app: String,
    pub timestamp: DateTime<Utc>,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    pub commit: String,
    pub origin: String,
    /// Empty when the deploy succeeded.
    pub error: String,
    pub image: String,
    pub can_rollback: bool,
    pub user: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub log: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub diff: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_date: Option<DateTime<Utc>>,
}

/// Build the history record for a deploy event.
///
/// With `images`, `can_rollback` reports whether the recorded image is still
/// valid and a versioned image is shortened to its `v<digits>` suffix.
/// Without it the image is shown as recorded and `can_rollback` is false.
pub fn project(event: &Event, images: Option<&ImageSet>, detail: Detail) -> DeployRecord {
    let id = &event.unique_id;
    let start: StartPayload = best_effort(id, event.start_data());
    let end: EndPayload = best_effort(id, event.end_data());

    let mut record = DeployRecord {
        id: id.clone(),
        app: event.target.value.clone(),
        timestamp: event.start_time,
        duration: event.duration().to_std().unwrap_or_default(),
        commit: start.commit,
        origin: start.origin,
        error: event.error.clone(),
        image: end.image,
        can_rollback: false,
        user: event.owner.name.clone(),
        log: String::new(),
        diff: String::new(),
        remove_date: event.remove_date,
    };

    if detail == Detail::Full {
        let other: OtherPayload = best_effort(id, event.other_data());
        record.log = event.log.clone();
        record.diff = other.diff;
    }

    if let Some(images) = images {
        record.can_rollback = images.contains(&record.image);
        if let Some(version) = version_suffix(&record.image) {
            record.image = version.to_string();
        }
    }

    record
}
