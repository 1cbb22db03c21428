// ABOUTME: Provisioner capability interfaces and the registry that resolves them.
// ABOUTME: Backends declare which deploy strategies they support.

mod catalog;
mod error;
mod registry;
mod traits;

pub use catalog::{CATALOG_PROVISIONER, CatalogProvisioner};
pub use error::ProvisionError;
pub use registry::ProvisionerRegistry;
pub use traits::{ArchiveDeployer, ImageDeployer, Provisioner, Upload, UploadDeployer};
