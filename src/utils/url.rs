//! URL utilities for consistent endpoint construction
//!
//! Server URLs come from user configuration and may carry trailing slashes;
//! these helpers keep the assembled endpoints free of doubled separators.

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use greenroom::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:8000"), "http://localhost:8000");
/// assert_eq!(normalize_base_url("http://localhost:8000/"), "http://localhost:8000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Construct a complete endpoint URL from a base URL and a path
///
/// # Examples
///
/// ```
/// use greenroom::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:8000/", "api/chat/stream"),
///     "http://localhost:8000/api/chat/stream"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://stage.local:9000/"),
            "http://stage.local:9000"
        );
        assert_eq!(
            normalize_base_url("http://stage.local:9000///"),
            "http://stage.local:9000"
        );
        assert_eq!(normalize_base_url(""), "");
    }

    #[test]
    fn test_construct_api_url() {
        assert_eq!(
            construct_api_url("http://localhost:8000", "api/scenes"),
            "http://localhost:8000/api/scenes"
        );
        assert_eq!(
            construct_api_url("http://localhost:8000/", "/api/scenes"),
            "http://localhost:8000/api/scenes"
        );
        assert_eq!(
            construct_api_url("http://localhost:8000///", "api/characters/3/scenes/s1"),
            "http://localhost:8000/api/characters/3/scenes/s1"
        );
    }
}
