use crate::config::LinkConfig;
use crate::error::DecodeError;

/// Shareable URL for `token`: `{base_url}/{route}/{token}`.
pub fn share_url(config: &LinkConfig, token: &str) -> String {
    format!(
        "{}/{}/{}",
        config.base_url.trim_end_matches('/'),
        config.route.trim_matches('/'),
        token
    )
}

/// Extracts the token segment that follows `/{route}/` in `url`. Query
/// strings and fragments are ignored.
pub fn token_from_url(config: &LinkConfig, url: &str) -> Result<String, DecodeError> {
    let marker = format!("/{}/", config.route.trim_matches('/'));
    let start = url
        .find(&marker)
        .map(|i| i + marker.len())
        .ok_or_else(|| DecodeError::Malformed(format!("url has no `{marker}` segment")))?;

    let rest = &url[start..];
    let end = rest
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .unwrap_or(rest.len());
    let token = &rest[..end];
    if token.is_empty() {
        return Err(DecodeError::Malformed("url has an empty token segment".into()));
    }
    Ok(token.to_string())
}
