//! Selector tables for the post and comment layouts.
//!
//! Comment markup differs between page versions, so several selector sets
//! probe the same logical content. Any of them may match; overlapping matches
//! collapse later at the identity + text level.

/// Comment fragment selectors, enhanced variant.
pub static ENHANCED_COMMENT_SELECTORS: &[&str] = &[
    "article ul li div div div span",
    r#"article div[role="button"] span"#,
    r#"[data-testid="comment"] span"#,
    "article section div div span",
    r#"article div span[dir="auto"]"#,
];

/// Comment fragment selectors, basic variant.
pub static BASIC_COMMENT_SELECTORS: &[&str] = &[
    "article ul li div div div span",
    r#"article div[role="button"] span"#,
    r#"[data-testid="comment"] span"#,
    "article section div div span",
];

/// Identity link selectors tried under each ancestor, enhanced variant.
pub static ENHANCED_LINK_SELECTORS: &[&str] = &[
    r#"a[href*="/"][role="link"]"#,
    r#"a[href*="/"]"#,
    r#"span[dir="auto"] a"#,
    r#"div a[href*="/"]"#,
];

/// Identity link selectors tried under each ancestor, basic variant.
pub static BASIC_LINK_SELECTORS: &[&str] = &[r#"a[href*="/"]"#];

/// Markers of a verified account.
pub static VERIFIED_SELECTORS: &[&str] = &[
    r#"[aria-label*="Verified"]"#,
    r#"[title*="Verified"]"#,
    r#"svg[aria-label*="Verified"]"#,
    ".verified-badge",
];

pub static NEARBY_TEXT_SELECTOR: &str = "span, a";

/// Region scrolled into view when plain scrolling stalls.
pub static CONTENT_ANCHOR: &str = "article section";

/// Labels of the explicit "load more" affordance.
pub static LOAD_MORE_LABELS: &[&str] = &["Load more comments", "View more comments"];

// Post metadata

pub static POST_AUTHOR_SELECTORS: &[&str] = &[
    "article header a",
    r#"header a[role="link"]"#,
    r#"article a[role="link"]"#,
];

pub static POST_CAPTION_SELECTORS: &[&str] = &[
    r#"article div[data-testid="post-caption"] span"#,
    r#"article div span[dir="auto"]"#,
    r#"article div[role="button"] span"#,
];

pub static POST_LIKES_SELECTORS: &[&str] = &[
    "article section div span",
    "article button span",
    r#"[aria-label*="like"]"#,
];

/// Elements that can act as a clickable "load more" affordance.
pub static CLICKABLE_SELECTOR: &str = r#"button, span, a, div[role="button"]"#;
