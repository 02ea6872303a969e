//! Compiled regex patterns for fragment classification and identity parsing.
//!
//! All patterns are compiled once at startup using `LazyLock` for efficiency.
//! Matching patterns are anchored and case-insensitive; callers trim first.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// UI Chrome Patterns
// =============================================================================

/// Action words rendered next to every comment.
pub static UI_ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(like|reply|view replies|translate|show more|hide|load more|see translation|follow|following|verified|view profile|message|call)$",
    )
    .expect("UI_ACTION regex")
});

/// Relative timestamps such as `2h` or `3d`.
pub static RELATIVE_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\d+[smhd]$").expect("RELATIVE_TIME regex"));

/// Lone separator bullet.
pub static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[•·]$").expect("BULLET regex"));

/// A mention with nothing else.
pub static BARE_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^@\w+$").expect("BARE_MENTION regex"));

/// Like/comment aggregates: `liked by alice and 20 others`, `View all 31 comments`.
pub static AGGREGATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(liked by(\s+[\w.]+(\s+and\s+[\d,.]+\s+others)?)?|and\s+[\d,.]+\s+others|view all\s+[\d,.]+\s+comments)$",
    )
    .expect("AGGREGATE regex")
});

/// A bare integer.
pub static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("BARE_NUMBER regex"));

/// Time-unit words left over from split timestamps.
pub static TIME_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(ago|hours?|days?|weeks?|months?)$").expect("TIME_UNIT regex")
});

/// Every pattern a content fragment must not match.
pub static UI_CHROME: LazyLock<[&'static Regex; 7]> = LazyLock::new(|| {
    [
        &*UI_ACTION,
        &*RELATIVE_TIME,
        &*BULLET,
        &*BARE_MENTION,
        &*AGGREGATE,
        &*BARE_NUMBER,
        &*TIME_UNIT,
    ]
});

// =============================================================================
// Identity Patterns
// =============================================================================

/// Shape of an account handle (length checked separately).
pub static HANDLE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._]+$").expect("HANDLE_TOKEN regex"));

/// Post and reel paths: captures the kind and the post id.
pub static POST_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(p|reel)/([^/?#]+)").expect("POST_PATH regex")
});

// =============================================================================
// Text Cleaning Patterns
// =============================================================================

/// Matches multiple whitespace characters for normalization.
pub static WHITESPACE_NORMALIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_NORMALIZE regex"));

/// First number in a counter such as `1,234 likes` or `1.2K likes`.
pub static COUNTER_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,.]*").expect("COUNTER_NUMBER regex"));
