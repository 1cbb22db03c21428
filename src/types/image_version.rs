// ABOUTME: Platform image version suffix handling.
// ABOUTME: Recognizes trailing "v<digits>" tags like registry/app:v5.

/// Returns the trailing `v<digits>` version of an image reference, if any.
///
/// Matches the shortest tail made of a `v` followed by at least one digit, so
/// `registry/app:v12` yields `v12` and `registry/app:latest` yields `None`.
pub fn version_suffix(image: &str) -> Option<&str> {
    let digits_start = image
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(idx, _)| idx)?;

    let prefix = &image[..digits_start];
    if prefix.ends_with('v') {
        Some(&image[digits_start - 1..])
    } else {
        None
    }
}

/// Whether an image reference already names a concrete platform version,
/// i.e. ends with `:v<digits>`.
pub fn is_fully_qualified(image: &str) -> bool {
    match version_suffix(image) {
        Some(version) => image[..image.len() - version.len()].ends_with(':'),
        None => false,
    }
}
