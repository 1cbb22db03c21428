// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Validates catalog app names and image references.

use std::collections::HashMap;

use serde::Deserialize;

use crate::types::AppName;

/// An empty `catalog:` key reads as an empty catalog.
pub fn deserialize_catalog<'de, D>(
    deserializer: D,
) -> Result<HashMap<String, Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: HashMap<String, Vec<String>> =
        Option::deserialize(deserializer)?.unwrap_or_default();
    let mut catalog = HashMap::with_capacity(raw.len());

    for (app, images) in raw {
        AppName::new(&app)
            .map_err(|e| serde::de::Error::custom(format!("catalog entry {app:?}: {e}")))?;
        if let Some(blank) = images.iter().find(|image| image.trim().is_empty()) {
            return Err(serde::de::Error::custom(format!(
                "catalog entry {app:?} has an empty image {blank:?}"
            )));
        }
        catalog.insert(app, images);
    }

    Ok(catalog)
}
