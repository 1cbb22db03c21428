// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod app_name;
mod id;
mod image_version;
mod origin;

pub use app_name::{AppName, AppNameError};
pub use id::{EventId, Id, ImageId, ParseEventIdError};
pub use image_version::{is_fully_qualified, version_suffix};
pub use origin::{InvalidOrigin, Origin, validate_origin};
