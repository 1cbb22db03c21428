// ABOUTME: Test support utilities.
// ABOUTME: Provides fake provisioners, failing stores, and event builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Once};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use parking_lot::Mutex;
use serde_json::json;
use tokio::io::AsyncReadExt;

use shipwright::app::{App, AppFilter};
use shipwright::event::permission::PERM_APP_DEPLOY;
use shipwright::event::{Event, EventHandle, Kind, Owner, Target};
use shipwright::migrate::LegacyDeploy;
use shipwright::provision::{
    ArchiveDeployer, ImageDeployer, ProvisionError, Provisioner, Upload, UploadDeployer,
};
use shipwright::store::{
    AppStore, EventFilter, EventStore, LegacyDeploySource, MemoryAppStore, MemoryEventStore,
    StoreError,
};
use shipwright::types::{AppName, EventId, ImageId};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("shipwright=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn app_name(name: &str) -> AppName {
    AppName::new(name).unwrap()
}

pub fn app(name: &str, provisioner: &str) -> App {
    App::new(app_name(name), provisioner)
}

/// A provisioner call as seen by [`FakeProvisioner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Rollback { app: String, image: String },
    ImageDeploy { app: String, image: String },
    UploadDeploy {
        app: String,
        size: u64,
        body: Vec<u8>,
        build_only: bool,
    },
    ArchiveDeploy { app: String, url: String },
    ValidImages { app: String },
}

/// Provisioner with a configurable capability set that records every call.
///
/// Deploy operations write a log line through the event and answer with
/// `"<app>:v<n>"` where n counts the calls.
pub struct FakeProvisioner {
    name: String,
    image: bool,
    upload: bool,
    archive: bool,
    images: HashMap<String, Vec<String>>,
    fail_deploys: Option<String>,
    fail_images: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl FakeProvisioner {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            image: false,
            upload: false,
            archive: false,
            images: HashMap::new(),
            fail_deploys: None,
            fail_images: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Supports image, upload, and archive deploys.
    pub fn full(name: &str) -> Self {
        Self::new(name).with_image().with_upload().with_archive()
    }

    pub fn with_image(mut self) -> Self {
        self.image = true;
        self
    }

    pub fn with_upload(mut self) -> Self {
        self.upload = true;
        self
    }

    pub fn with_archive(mut self) -> Self {
        self.archive = true;
        self
    }

    pub fn with_valid_images<I, S>(mut self, app: &str, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images
            .insert(app.to_string(), images.into_iter().map(Into::into).collect());
        self
    }

    /// Every deploy and rollback fails with this message.
    pub fn failing_deploys(mut self, message: &str) -> Self {
        self.fail_deploys = Some(message.to_string());
        self
    }

    /// Image listing fails with this message.
    pub fn failing_images(mut self, message: &str) -> Self {
        self.fail_images = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Calls other than image listings.
    pub fn deploy_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::ValidImages { .. }))
            .collect()
    }

    fn run(&self, call: Call, event: &EventHandle) -> Result<ImageId, ProvisionError> {
        let app = match &call {
            Call::Rollback { app, .. }
            | Call::ImageDeploy { app, .. }
            | Call::UploadDeploy { app, .. }
            | Call::ArchiveDeploy { app, .. }
            | Call::ValidImages { app } => app.clone(),
        };
        let count = {
            let mut calls = self.calls.lock();
            calls.push(call);
            calls.len()
        };
        event
            .write_log(format!("{} deploying {}\n", self.name, app).as_bytes())
            .map_err(|e| ProvisionError::Backend(e.to_string()))?;

        match &self.fail_deploys {
            Some(message) => Err(ProvisionError::DeployFailed(message.clone())),
            None => Ok(ImageId::new(format!("{app}:v{count}"))),
        }
    }
}

#[async_trait]
impl Provisioner for FakeProvisioner {
    fn name(&self) -> &str {
        &self.name
    }

    async fn valid_app_images(&self, app: &str) -> Result<Vec<String>, ProvisionError> {
        self.calls.lock().push(Call::ValidImages {
            app: app.to_string(),
        });
        if let Some(message) = &self.fail_images {
            return Err(ProvisionError::Backend(message.clone()));
        }
        Ok(self.images.get(app).cloned().unwrap_or_default())
    }

    async fn rollback(
        &self,
        app: &App,
        image: &str,
        event: &EventHandle,
    ) -> Result<ImageId, ProvisionError> {
        self.run(
            Call::Rollback {
                app: app.name.to_string(),
                image: image.to_string(),
            },
            event,
        )
    }

    fn as_image_deployer(&self) -> Option<&dyn ImageDeployer> {
        self.image.then_some(self as &dyn ImageDeployer)
    }

    fn as_upload_deployer(&self) -> Option<&dyn UploadDeployer> {
        self.upload.then_some(self as &dyn UploadDeployer)
    }

    fn as_archive_deployer(&self) -> Option<&dyn ArchiveDeployer> {
        self.archive.then_some(self as &dyn ArchiveDeployer)
    }
}

#[async_trait]
impl ImageDeployer for FakeProvisioner {
    async fn image_deploy(
        &self,
        app: &App,
        image: &str,
        event: &EventHandle,
    ) -> Result<ImageId, ProvisionError> {
        self.run(
            Call::ImageDeploy {
                app: app.name.to_string(),
                image: image.to_string(),
            },
            event,
        )
    }
}

#[async_trait]
impl UploadDeployer for FakeProvisioner {
    async fn upload_deploy(
        &self,
        app: &App,
        mut upload: Upload,
        build_only: bool,
        event: &EventHandle,
    ) -> Result<ImageId, ProvisionError> {
        let mut body = Vec::new();
        upload
            .reader
            .read_to_end(&mut body)
            .await
            .map_err(|e| ProvisionError::Backend(e.to_string()))?;
        self.run(
            Call::UploadDeploy {
                app: app.name.to_string(),
                size: upload.size,
                body,
                build_only,
            },
            event,
        )
    }
}

#[async_trait]
impl ArchiveDeployer for FakeProvisioner {
    async fn archive_deploy(
        &self,
        app: &App,
        url: &str,
        event: &EventHandle,
    ) -> Result<ImageId, ProvisionError> {
        self.run(
            Call::ArchiveDeploy {
                app: app.name.to_string(),
                url: url.to_string(),
            },
            event,
        )
    }
}

/// App store whose counter and platform flag updates can be made to fail.
pub struct FlakyAppStore {
    pub inner: MemoryAppStore,
    pub fail_increment: bool,
    pub fail_platform: bool,
}

impl FlakyAppStore {
    pub fn new(apps: impl IntoIterator<Item = App>) -> Self {
        Self {
            inner: MemoryAppStore::new(apps),
            fail_increment: false,
            fail_platform: false,
        }
    }
}

#[async_trait]
impl AppStore for FlakyAppStore {
    async fn get_by_name(&self, name: &AppName) -> Result<App, StoreError> {
        self.inner.get_by_name(name).await
    }

    async fn list(&self, filter: &AppFilter) -> Result<Vec<App>, StoreError> {
        self.inner.list(filter).await
    }

    async fn increment_deploys(&self, name: &AppName) -> Result<u64, StoreError> {
        if self.fail_increment {
            return Err(StoreError::Backend("counter unavailable".to_string()));
        }
        self.inner.increment_deploys(name).await
    }

    async fn set_update_platform(&self, name: &AppName, value: bool) -> Result<(), StoreError> {
        if self.fail_platform {
            return Err(StoreError::Backend("flag unavailable".to_string()));
        }
        self.inner.set_update_platform(name, value).await
    }
}

/// Event store that refuses inserts after a number of successful ones.
pub struct FlakyEventStore {
    pub inner: MemoryEventStore,
    inserts_left: Mutex<usize>,
}

impl FlakyEventStore {
    pub fn failing_after(inserts: usize) -> Self {
        Self {
            inner: MemoryEventStore::default(),
            inserts_left: Mutex::new(inserts),
        }
    }
}

#[async_trait]
impl EventStore for FlakyEventStore {
    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        self.inner.list(filter).await
    }

    async fn get_by_id(&self, id: &EventId) -> Result<Event, StoreError> {
        self.inner.get_by_id(id).await
    }

    async fn insert(&self, event: Event) -> Result<(), StoreError> {
        {
            let mut left = self.inserts_left.lock();
            if *left == 0 {
                return Err(StoreError::Backend("disk full".to_string()));
            }
            *left -= 1;
        }
        self.inner.insert(event).await
    }
}

/// Legacy rows followed by a read failure.
pub struct BrokenLegacySource {
    pub rows: Vec<LegacyDeploy>,
}

impl LegacyDeploySource for BrokenLegacySource {
    fn legacy_deploys(&self) -> BoxStream<'_, Result<LegacyDeploy, StoreError>> {
        let rows = self.rows.iter().cloned().map(Ok);
        let failure = std::iter::once(Err(StoreError::Backend("cursor lost".to_string())));
        stream::iter(rows.chain(failure)).boxed()
    }
}

/// Shared in-memory writer used as deploy output.
#[derive(Clone, Default)]
pub struct SharedOutput(Arc<Mutex<Vec<u8>>>);

impl SharedOutput {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A finished deploy event for `app` that started `minutes_ago`.
pub fn deploy_event(app: &str, image: &str, minutes_ago: i64) -> Event {
    deploy_event_at(app, image, Utc::now() - Duration::minutes(minutes_ago))
}

pub fn deploy_event_at(app: &str, image: &str, start: DateTime<Utc>) -> Event {
    let mut event = Event::new(
        Target::app(app),
        Owner::user("alice"),
        Kind::permission(PERM_APP_DEPLOY),
    );
    event.start_time = start;
    event.end_time = Some(start + Duration::seconds(30));
    event.log = format!("deploying {app}\n");
    event.start_custom_data = Some(json!({"commit": "abc123", "origin": "git"}));
    event.end_custom_data = Some(json!({"image": image}));
    event
}

/// A legacy row for `app` with a fresh id.
pub fn legacy_row(app: &str, image: &str) -> LegacyDeploy {
    LegacyDeploy {
        id: EventId::generate(),
        app: app.to_string(),
        timestamp: Utc::now() - Duration::days(400),
        duration: std::time::Duration::from_secs(42),
        commit: "deadbeef".to_string(),
        error: String::new(),
        image: image.to_string(),
        log: "legacy log".to_string(),
        user: "carol".to_string(),
        origin: "app-deploy".to_string(),
        can_rollback: false,
        remove_date: None,
        diff: String::new(),
    }
}
