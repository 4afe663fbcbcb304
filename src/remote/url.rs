//! Repository URL normalization and parsing.

use super::client::RemoteError;

/// Parse a repository web URL into `(owner, repo)`.
///
/// The URL is normalized first: surrounding whitespace and a trailing
/// slash are stripped, as is a trailing `.git` suffix. After
/// normalization the URL must have exactly the shape
/// `http(s)://host/owner/repo` — extra path segments are rejected.
///
/// # Errors
/// Returns [`RemoteError::InvalidUrl`] if the URL does not match.
pub fn parse_repo_url(url: &str) -> Result<(String, String), RemoteError> {
    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .ok_or_else(|| RemoteError::InvalidUrl(url.trim().to_string()))?;

    let mut segments = rest.split('/');
    let host = segments.next().unwrap_or_default();
    let owner = segments.next().unwrap_or_default();
    let repo = segments.next().unwrap_or_default();

    if host.is_empty() || owner.is_empty() || repo.is_empty() || segments.next().is_some() {
        return Err(RemoteError::InvalidUrl(url.trim().to_string()));
    }

    Ok((owner.to_string(), repo.to_string()))
}
