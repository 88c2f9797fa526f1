//! Public path and manifest key normalization.

/// True for full URLs such as `https://cdn.example.com/build/`.
pub fn is_absolute_url(path: &str) -> bool {
    path.contains("://")
}

/// Appends exactly one trailing slash.
pub fn with_trailing_slash(path: &str) -> String {
    format!("{}/", path.trim_end_matches('/'))
}

/// Normalized public path, plus whether the input looks like an unintended relative path.
pub fn normalize_public_path(path: &str) -> (String, bool) {
    let suspicious = !path.starts_with('/') && !is_absolute_url(path);
    (with_trailing_slash(path), suspicious)
}

/// Normalized manifest key prefix, plus whether it starts with a slash.
///
/// A blank prefix is kept untouched: it means "no prefix at all".
pub fn normalize_manifest_key_prefix(prefix: &str) -> (String, bool) {
    if prefix.trim().is_empty() {
        return (prefix.to_string(), false);
    }
    (with_trailing_slash(prefix), prefix.starts_with('/'))
}

/// Manifest key prefix used when none was set explicitly: the public path
/// without its leading slash.
pub fn derive_manifest_key_prefix(public_path: &str) -> String {
    public_path
        .strip_prefix('/')
        .unwrap_or(public_path)
        .to_string()
}
