// Image URL resolution against the configured API base.

/// Resolve a painting's `image_url` to something fetchable.
///
/// Absolute URLs pass through. Relative paths are joined onto `base_url` when
/// one is configured, and returned unchanged otherwise.
pub fn resolve_image_url(url: Option<&str>, base_url: Option<&str>) -> Option<String> {
    let url = url.filter(|u| !u.is_empty())?;
    if url.starts_with("http") {
        return Some(url.to_string());
    }
    let Some(base) = base_url else {
        return Some(url.to_string());
    };
    if url.starts_with('/') {
        Some(format!("{base}{url}"))
    } else {
        Some(format!("{base}/{url}"))
    }
}
