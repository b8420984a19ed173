//! Endpoint URL construction.

/// Error type for base URL and endpoint failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse the configured base URL.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to http:// if missing
/// 3. Drop query and fragment
/// 4. Ensure the path ends with `/` so endpoints join beneath it
pub fn parse_base(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("http://{trimmed}") };

    let mut parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_query(None);
    parsed.set_fragment(None);
    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }

    Ok(parsed)
}

/// Resolve an endpoint path (e.g. `/api/content/faq`) against the base.
///
/// A leading `/` is relative to the base path, not the host root, so a base
/// of `https://example.com/site/` maps `/api/x` to `https://example.com/site/api/x`.
pub fn endpoint_url(base: &url::Url, endpoint: &str) -> Result<url::Url, UrlError> {
    let relative = endpoint.trim().trim_start_matches('/');
    base.join(relative).map_err(|e| UrlError::InvalidUrl(e.to_string()))
}
