// ABOUTME: Resolution of user-supplied rollback targets.
// ABOUTME: Expands short versions like "v3" to a full image the app can still run.

use crate::image_set::ImageSet;
use crate::types::is_fully_qualified;

use super::DeployError;

/// Resolve a rollback target against the app's valid images.
///
/// Targets already ending in `:v<digits>` are returned unchanged and
/// `images` is never invoked. Otherwise the first valid image ending with
/// `target` wins. A match equal to the target expands nothing and counts as
/// no match. Set iteration is unordered, so if several images share the
/// suffix the choice between them is arbitrary.
///
/// If the valid images cannot be listed the target is passed through
/// unresolved and the provisioner decides.
///
/// # Errors
///
/// Returns [`DeployError::InvalidRollbackTarget`] carrying the unresolved
/// target when no valid image matches.
pub async fn resolve_rollback_target<F, Fut, E>(
    target: &str,
    images: F,
) -> Result<String, DeployError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<ImageSet, E>>,
    E: std::fmt::Display,
{
    if is_fully_qualified(target) {
        return Ok(target.to_string());
    }

    let images = match images().await {
        Ok(images) => images,
        Err(e) => {
            tracing::warn!(
                "could not list valid images, rolling back to {:?} unresolved: {}",
                target,
                e
            );
            return Ok(target.to_string());
        }
    };

    // A match that is the target itself expands nothing and is rejected.
    match images.find_by_suffix(target) {
        Some(image) if image != target => {
            tracing::debug!("resolved rollback target {:?} to {}", target, image);
            Ok(image.to_string())
        }
        _ => Err(DeployError::InvalidRollbackTarget(target.to_string())),
    }
}
