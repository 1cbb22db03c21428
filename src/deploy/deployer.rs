// ABOUTME: Runs a deploy request against the app's provisioner.
// ABOUTME: Resolves the kind and rollback target, streams logs, and updates app counters.

use std::sync::Arc;

use crate::app::App;
use crate::diagnostics::{Diagnostics, Warning};
use crate::event::EventHandle;
use crate::image_set::find_valid_images;
use crate::logs::{AppLogSink, LogAttachment, NullLogSink};
use crate::provision::{ProvisionerRegistry, Upload};
use crate::store::AppStore;
use crate::types::ImageId;

use super::rollback::resolve_rollback_target;
use super::strategy::{DeployRoute, DeployStrategy};
use super::{DeployError, DeployKind, DeployRequest, EndPayload};

/// Result of a successful deploy.
#[derive(Debug)]
pub struct DeployOutcome {
    /// Image produced or activated by the provisioner.
    pub image_id: ImageId,
    pub kind: DeployKind,
    pub strategy: DeployStrategy,
    /// Side effects that failed after the deploy itself succeeded.
    pub diagnostics: Diagnostics,
}

impl DeployOutcome {
    /// End payload to finish the deploy event with.
    pub fn end_payload(&self) -> EndPayload {
        EndPayload {
            image: self.image_id.to_string(),
        }
    }
}

/// Dispatches deploys to provisioners.
pub struct Deployer {
    apps: Arc<dyn AppStore>,
    provisioners: ProvisionerRegistry,
    logs: Arc<dyn AppLogSink>,
}

impl std::fmt::Debug for Deployer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deployer")
            .field("provisioners", &self.provisioners)
            .finish_non_exhaustive()
    }
}

/// Request fields a provisioner call may need, split off the request.
struct Source {
    image: String,
    archive_url: String,
    file: Option<Upload>,
    build_only: bool,
}

impl Deployer {
    pub fn new(apps: Arc<dyn AppStore>, provisioners: ProvisionerRegistry) -> Self {
        Self {
            apps,
            provisioners,
            logs: Arc::new(NullLogSink),
        }
    }

    /// Send deploy output to `sink` as app logs.
    pub fn with_log_sink(mut self, sink: Arc<dyn AppLogSink>) -> Self {
        self.logs = sink;
        self
    }

    /// Run one deploy.
    ///
    /// The provisioner error of a failed deploy is returned unchanged. After
    /// a successful deploy the app's deploy counter is incremented and a
    /// pending platform update is cleared; failures there are collected in
    /// [`DeployOutcome::diagnostics`] and never fail the deploy.
    ///
    /// # Errors
    ///
    /// - [`DeployError::MissingEvent`] if the request has no event, before
    ///   anything else happens
    /// - [`DeployError::InvalidRollbackTarget`] if a rollback target matches
    ///   no valid image
    /// - [`DeployError::MissingArchiveDeployer`] if the provisioner cannot
    ///   serve the request at all
    /// - [`DeployError::Provision`] for provisioner failures
    pub async fn deploy(&self, request: DeployRequest) -> Result<DeployOutcome, DeployError> {
        let Some(event) = request.event.clone() else {
            return Err(DeployError::MissingEvent);
        };
        let kind = DeployKind::resolve(&request);

        let DeployRequest {
            app,
            image,
            archive_url,
            file,
            build_only,
            output,
            ..
        } = request;

        let image = if kind == DeployKind::Rollback {
            resolve_rollback_target(&image, || {
                find_valid_images(std::slice::from_ref(&app), &self.provisioners)
            })
            .await?
        } else {
            image
        };

        tracing::info!("deploying {} ({}) for event {}", app.name, kind, event.id());

        let source = Source {
            image,
            archive_url,
            file,
            build_only,
        };
        let attachment = LogAttachment::attach(&event, app.name.as_str(), output, self.logs.clone());
        let result = self.dispatch(kind, &app, source, &event).await;
        attachment.close().await;
        let (image_id, strategy) = result?;

        let diagnostics = self.after_deploy(&app).await;
        tracing::info!("deployed {} as {} via {}", app.name, image_id, strategy);

        Ok(DeployOutcome {
            image_id,
            kind,
            strategy,
            diagnostics,
        })
    }

    async fn dispatch(
        &self,
        kind: DeployKind,
        app: &App,
        source: Source,
        event: &EventHandle,
    ) -> Result<(ImageId, DeployStrategy), DeployError> {
        let provisioner = self.provisioners.for_app(app)?;
        let route = DeployStrategy::select(kind, provisioner.as_ref())?;
        let strategy = route.strategy();
        tracing::debug!(
            "{} deploy of {} routed to {} on {}",
            kind,
            app.name,
            strategy,
            provisioner.name()
        );

        let image_id = match route {
            DeployRoute::Rollback => provisioner.rollback(app, &source.image, event).await?,
            DeployRoute::Image(deployer) => {
                deployer.image_deploy(app, &source.image, event).await?
            }
            DeployRoute::Upload(deployer) => {
                let upload = source.file.unwrap_or_else(Upload::empty);
                deployer
                    .upload_deploy(app, upload, source.build_only, event)
                    .await?
            }
            DeployRoute::Archive(deployer) => {
                deployer
                    .archive_deploy(app, &source.archive_url, event)
                    .await?
            }
        };
        Ok((image_id, strategy))
    }

    /// Best-effort bookkeeping once the deploy itself succeeded.
    async fn after_deploy(&self, app: &App) -> Diagnostics {
        let mut diagnostics = Diagnostics::default();

        match self.apps.increment_deploys(&app.name).await {
            Ok(count) => tracing::debug!("{} now has {} deploys", app.name, count),
            Err(e) => diagnostics.warn(Warning::deploy_counter(format!(
                "couldn't increment deploy count for {}: {}",
                app.name, e
            ))),
        }

        if app.update_platform
            && let Err(e) = self.apps.set_update_platform(&app.name, false).await
        {
            diagnostics.warn(Warning::platform_flag(format!(
                "couldn't clear pending platform update for {}: {}",
                app.name, e
            )));
        }

        diagnostics
    }
}
