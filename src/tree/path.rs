//! Key path splitting and normalization

/// Split a store key into its non-empty segments.
///
/// `"/a//b/"` yields `["a", "b"]`; the root key yields nothing.
pub fn split_key(key: &str) -> Vec<&str> {
    key.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Normalize a watch path: leading slash, no trailing slash (except root),
/// no repeated separators.
pub fn normalize_watch_path(path: &str) -> String {
    let segments = split_key(path);
    if segments.is_empty() {
        return "/".to_string();
    }

    let mut result = String::with_capacity(path.len() + 1);
    for segment in segments {
        result.push('/');
        result.push_str(segment);
    }
    result
}
