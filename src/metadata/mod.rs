//! Post metadata extraction module.
//!
//! Best-effort lookups of the post's author, caption, like count and page
//! title. A lookup that fails leaves its field at the default and records a
//! warning; only a session-fatal page error stops the collection.

pub mod counter;

use tracing::{debug, warn};

use crate::error::{PageError, PageResult};
use crate::identity::strategies::handle_from_href;
use crate::options::Options;
use crate::page::Page;
use crate::result::PostMetadata;
use crate::selectors::{POST_AUTHOR_SELECTORS, POST_CAPTION_SELECTORS, POST_LIKES_SELECTORS};
use crate::url_utils::PostUrl;

pub use counter::{parse_counter, truncate_caption};

/// Extract all post metadata.
///
/// Orchestrates the lookups in order:
/// 1. Author (profile link in the post header)
/// 2. Caption (longest caption-like text)
/// 3. Likes (first counter mentioning likes)
/// 4. Page title
///
/// # Returns
/// * The metadata and one warning per lookup that fell back to its default
pub async fn extract_post_metadata(
    page: &dyn Page,
    post: &PostUrl,
    opts: &Options,
) -> PageResult<(PostMetadata, Vec<String>)> {
    let mut warnings = Vec::new();
    let mut metadata = PostMetadata {
        url: post.url.to_string(),
        post_id: Some(post.post_id.clone()),
        kind: post.kind,
        ..PostMetadata::default()
    };

    match extract_post_author(page, opts).await? {
        Some(author) => metadata.author = author,
        None => warnings.push("post author not found".to_string()),
    }

    match extract_post_caption(page, opts).await? {
        Some(caption) => metadata.caption = caption,
        None => warnings.push("post caption not found".to_string()),
    }

    match extract_post_likes(page).await? {
        Some(likes) => metadata.likes = likes,
        None => warnings.push("like count not found".to_string()),
    }

    match page.title().await {
        Ok(title) => metadata.page_title = title,
        Err(err) if err.is_fatal() => return Err(err),
        Err(err) => warnings.push(format!("page title unavailable: {err}")),
    }

    for warning in &warnings {
        warn!(%warning, "post metadata degraded");
    }
    Ok((metadata, warnings))
}

/// Handle of the post author, from the first profile link in the header.
pub async fn extract_post_author(page: &dyn Page, opts: &Options) -> PageResult<Option<String>> {
    for selector in POST_AUTHOR_SELECTORS {
        for link in lookup(page.find_all(selector).await)?.unwrap_or_default() {
            let Some(href) = lookup(page.attribute(link, "href").await)?.flatten() else {
                continue;
            };
            if href.contains("/p/") || href.contains("/reel/") {
                continue;
            }
            if let Some(handle) = handle_from_href(&href, opts.max_handle_len) {
                return Ok(Some(handle));
            }
        }
    }
    Ok(None)
}

/// Longest caption candidate, truncated to `opts.caption_limit` characters.
pub async fn extract_post_caption(page: &dyn Page, opts: &Options) -> PageResult<Option<String>> {
    let mut longest: Option<String> = None;
    for selector in POST_CAPTION_SELECTORS {
        for element in lookup(page.find_all(selector).await)?.unwrap_or_default() {
            let Some(text) = lookup(page.text(element).await)? else {
                continue;
            };
            let text = text.trim();
            if !text.is_empty() && longest.as_ref().is_none_or(|best| text.chars().count() > best.chars().count()) {
                longest = Some(text.to_string());
            }
        }
    }
    Ok(longest.map(|caption| truncate_caption(&caption, opts.caption_limit)))
}

/// First counter text that mentions likes.
pub async fn extract_post_likes(page: &dyn Page) -> PageResult<Option<u64>> {
    for selector in POST_LIKES_SELECTORS {
        for element in lookup(page.find_all(selector).await)?.unwrap_or_default() {
            let Some(text) = lookup(page.text(element).await)? else {
                continue;
            };
            if !text.to_lowercase().contains("like") || !text.chars().any(|c| c.is_ascii_digit()) {
                continue;
            }
            if let Some(likes) = parse_counter(&text) {
                return Ok(Some(likes));
            }
        }
    }
    Ok(None)
}

fn lookup<T>(result: PageResult<T>) -> Result<Option<T>, PageError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_fatal() => Err(err),
        Err(err) => {
            debug!(error = %err, "metadata lookup failed");
            Ok(None)
        }
    }
}
