// ABOUTME: The set of images still valid for one or more apps.
// ABOUTME: Rebuilt on every query by asking each app's provisioner.

use std::collections::HashSet;

use futures::future::try_join_all;

use crate::app::App;
use crate::provision::{ProvisionError, ProvisionerRegistry};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSet {
    images: HashSet<String>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<I, S>(&mut self, images: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images.extend(images.into_iter().map(Into::into));
    }

    pub fn contains(&self, image: &str) -> bool {
        self.images.contains(image)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.images.iter().map(String::as_str)
    }

    /// Some image ending with `suffix`. Iteration order is unspecified, so
    /// when several images share the suffix any of them may be returned.
    pub fn find_by_suffix(&self, suffix: &str) -> Option<&str> {
        self.iter().find(|image| image.ends_with(suffix))
    }
}

impl<S: Into<String>> FromIterator<S> for ImageSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ImageSet::new();
        set.add(iter);
        set
    }
}

/// Union of the valid images of every app in `apps`.
///
/// Each app's provisioner is queried once; any failure aborts the whole set.
pub async fn find_valid_images(
    apps: &[App],
    provisioners: &ProvisionerRegistry,
) -> Result<ImageSet, ProvisionError> {
    let lookups = apps.iter().map(|app| async move {
        let provisioner = provisioners.for_app(app)?;
        provisioner.valid_app_images(app.name.as_str()).await
    });

    let mut set = ImageSet::new();
    for images in try_join_all(lookups).await? {
        set.add(images);
    }
    tracing::debug!("found {} valid images across {} apps", set.len(), apps.len());
    Ok(set)
}
