// ABOUTME: Deploy dispatch: request classification, rollback resolution, and routing.
// ABOUTME: Exports the Deployer that runs a request against the app's provisioner.

mod deployer;
mod error;
mod kind;
mod request;
mod rollback;
mod strategy;

pub use deployer::{DeployOutcome, Deployer};
pub use error::{DeployError, DeployErrorKind};
pub use kind::DeployKind;
pub use request::{DeployRequest, EndPayload, OtherPayload, StartPayload};
pub use rollback::resolve_rollback_target;
pub use strategy::{DeployRoute, DeployStrategy};
