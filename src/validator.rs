//! Content fragment classification.
//!
//! Separates real comment text from the UI chrome that the comment selectors
//! also match (action buttons, timestamps, counters, bare mentions).

use crate::patterns::UI_CHROME;

/// Returns true when `text` looks like real comment content.
///
/// Rejects fragments that are shorter than two characters after trimming,
/// that match any UI-chrome pattern (case-insensitive), or that contain no
/// alphanumeric character at all.
///
/// # Example
///
/// ```rust
/// use rs_harvest::is_valid_content;
///
/// assert!(is_valid_content("Pick me please!!"));
/// assert!(!is_valid_content("Reply"));
/// assert!(!is_valid_content("3d"));
/// ```
#[must_use]
pub fn is_valid_content(text: &str) -> bool {
    let text = text.trim();

    if text.chars().count() < 2 {
        return false;
    }

    if UI_CHROME.iter().any(|pattern| pattern.is_match(text)) {
        return false;
    }

    // Emoji, punctuation or symbols only
    text.chars().any(char::is_alphanumeric)
}
