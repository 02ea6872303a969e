//! URL Utility Functions
//!
//! Validation of post URLs and host checks on the page's current URL.

use url::Url;

use crate::error::{Error, Result};
use crate::patterns::POST_PATH;
use crate::result::PostKind;

/// A validated post URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostUrl {
    pub url: Url,
    /// Shortcode from the `/p/<id>` or `/reel/<id>` path.
    pub post_id: String,
    pub kind: PostKind,
}

/// Check if a string is a valid absolute http(s) URL.
///
/// # Returns
/// * The parsed URL when it is absolute and has a host
#[must_use]
pub fn parse_absolute_url(s: &str) -> Option<Url> {
    let s = s.trim();

    // Must start with http:// or https://
    if !s.starts_with("http://") && !s.starts_with("https://") {
        return None;
    }

    Url::parse(s).ok().filter(|url| url.host_str().is_some())
}

/// Whether `host` is `target` or one of its subdomains.
///
/// Comparison ignores case and a trailing dot.
#[must_use]
pub fn host_matches(host: &str, target: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let target = target.trim_end_matches('.').to_ascii_lowercase();

    host == target
        || host
            .strip_suffix(target.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Whether a URL string points at the target site.
#[must_use]
pub fn is_on_host(url_str: &str, target: &str) -> bool {
    parse_absolute_url(url_str)
        .and_then(|url| url.host_str().map(|host| host_matches(host, target)))
        .unwrap_or(false)
}

/// Post id and kind from a URL path.
#[must_use]
pub fn post_path(path: &str) -> Option<(PostKind, String)> {
    let caps = POST_PATH.captures(path)?;
    let kind = match caps.get(1)?.as_str() {
        "p" => PostKind::Post,
        "reel" => PostKind::Reel,
        _ => PostKind::Unknown,
    };
    Some((kind, caps.get(2)?.as_str().to_string()))
}

/// Validate the URL of a post to harvest.
///
/// Accepts absolute http(s) URLs on `target_host` (or a subdomain) whose path
/// names a post (`/p/<id>`) or a reel (`/reel/<id>`).
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] naming the first check that failed.
pub fn validate_post_url(input: &str, target_host: &str) -> Result<PostUrl> {
    let url = parse_absolute_url(input)
        .ok_or_else(|| Error::InvalidInput(format!("not an absolute http(s) URL: {input:?}")))?;

    let host = url.host_str().unwrap_or_default();
    if !host_matches(host, target_host) {
        return Err(Error::InvalidInput(format!("{host} is not on {target_host}")));
    }

    let (kind, post_id) = post_path(url.path())
        .ok_or_else(|| Error::InvalidInput(format!("not a post or reel path: {}", url.path())))?;

    Ok(PostUrl { url, post_id, kind })
}
