//! Identity strategies.
//!
//! Each strategy is a pure function over a [`FragmentContext`] gathered from
//! the page. Strategies are tried in order and the first handle wins.

use std::sync::LazyLock;

use url::Url;

use crate::identity::FragmentContext;
use crate::options::Options;
use crate::patterns::{BARE_NUMBER, HANDLE_TOKEN, RELATIVE_TIME, TIME_UNIT, UI_ACTION};
use crate::result::IdentitySource;

/// A strategy returns a handle, or `None` to defer to the next strategy.
pub type IdentityStrategy = fn(&FragmentContext, &Options) -> Option<String>;

/// Link strategy only.
pub static BASIC: &[(IdentitySource, IdentityStrategy)] =
    &[(IdentitySource::LinkStrategy, link_strategy)];

/// Link strategy, then nearby text.
pub static ENHANCED: &[(IdentitySource, IdentityStrategy)] = &[
    (IdentitySource::LinkStrategy, link_strategy),
    (IdentitySource::NearbyTextStrategy, nearby_text_strategy),
];

/// Path fragments and hosts of links that never point at a profile.
static EXCLUDED_LINK_PARTS: &[&str] = &[
    "/p/",
    "/reel/",
    "/tv/",
    "/explore/",
    "/accounts/",
    "/direct/",
    "/stories/",
    "/live/",
    "/shop/",
    "facebook.com",
    "twitter.com",
    "youtube.com",
];

/// Base for resolving relative profile links.
static LINK_BASE: LazyLock<Option<Url>> =
    LazyLock::new(|| Url::parse("https://instagram.com/").ok());

/// First identity link found, walking ancestor levels nearest first.
#[must_use]
pub fn link_strategy(ctx: &FragmentContext, options: &Options) -> Option<String> {
    ctx.ancestor_links
        .iter()
        .flatten()
        .filter(|href| is_identity_link(href))
        .find_map(|href| handle_from_href(href, options.max_handle_len))
}

/// First handle-shaped text near the fragment.
///
/// Skips the fragment's own text and UI chrome that happens to be
/// handle-shaped (`Reply`, `2h`, `42`).
#[must_use]
pub fn nearby_text_strategy(ctx: &FragmentContext, options: &Options) -> Option<String> {
    ctx.nearby_texts
        .iter()
        .map(|text| text.trim())
        .filter(|text| *text != ctx.text.trim())
        .filter(|text| !is_chrome_token(text))
        .find_map(|text| {
            let candidate = text.replace('@', "");
            looks_like_handle(&candidate, options.max_handle_len).then_some(candidate)
        })
}

/// Whether a link may point at a profile.
#[must_use]
pub fn is_identity_link(href: &str) -> bool {
    !href.is_empty() && !EXCLUDED_LINK_PARTS.iter().any(|part| href.contains(part))
}

/// Trailing path segment of a profile link, when it is handle-shaped.
///
/// Relative links are resolved against the site root. Query strings and
/// fragments are ignored; a leading `@` is stripped.
#[must_use]
pub fn handle_from_href(href: &str, max_len: usize) -> Option<String> {
    let base = LINK_BASE.as_ref()?;
    let url = base.join(href.trim()).ok()?;
    let segment = url.path_segments()?.rev().find(|s| !s.is_empty())?;
    let handle = segment.strip_prefix('@').unwrap_or(segment);

    if handle.starts_with("explore") {
        return None;
    }
    looks_like_handle(handle, max_len).then(|| handle.to_string())
}

/// Alphanumerics, dots and underscores, 1 to `max_len` characters.
#[must_use]
pub fn looks_like_handle(text: &str, max_len: usize) -> bool {
    let len = text.chars().count();
    (1..=max_len).contains(&len) && HANDLE_TOKEN.is_match(text)
}

fn is_chrome_token(text: &str) -> bool {
    UI_ACTION.is_match(text) || RELATIVE_TIME.is_match(text) || BARE_NUMBER.is_match(text) || TIME_UNIT.is_match(text)
}
