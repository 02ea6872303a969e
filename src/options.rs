//! Configuration options for harvesting.
//!
//! The `Options` struct controls every tunable of the engine: which selector
//! sets probe for comment fragments, how far identity lookups walk up the
//! tree, and how patient the incremental loader is before giving up.
//!
//! The loader thresholds and settle delays were chosen empirically against a
//! live page and depend on its real load latency, so they are all fields
//! here rather than constants.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::selectors;

/// Configuration options for a harvest.
///
/// All fields are public for easy configuration. `Options::default()` is the
/// enhanced variant; [`Options::basic`] reproduces the lighter variant.
/// Options deserialize from JSON with every field optional.
///
/// # Example
///
/// ```rust
/// use rs_harvest::Options;
///
/// let options = Options {
///     max_iterations: 50,
///     target_count: Some(500),
///     ..Options::default()
/// };
/// assert!(options.nearby_text_fallback);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    /// CSS selector sets probing the layout variants of a comment fragment.
    ///
    /// Each set is run independently and the matches are unioned in set order.
    ///
    /// Default: five enhanced-layout selectors
    pub selector_sets: Vec<String>,

    /// Selectors for identity links searched under each ancestor level.
    pub link_selectors: Vec<String>,

    /// Selectors for a "verified" marker searched under each ancestor level.
    pub verified_selectors: Vec<String>,

    /// Selector for text elements probed by the nearby-text strategy.
    ///
    /// Default: `"span, a"`
    pub nearby_text_selector: String,

    /// Ancestor levels walked by the link strategy.
    ///
    /// Default: `6`
    pub identity_levels: usize,

    /// Ancestor levels walked when looking for a verified marker.
    ///
    /// Default: `5`
    pub verified_levels: usize,

    /// Ancestor level whose descendants the nearby-text strategy inspects.
    ///
    /// Default: `2`
    pub nearby_levels: usize,

    /// Try the nearby-text strategy when no identity link is found.
    ///
    /// Default: `true`
    pub nearby_text_fallback: bool,

    /// Longest accepted identity handle (characters).
    ///
    /// Default: `30`
    pub max_handle_len: usize,

    /// Grow the page before extracting.
    ///
    /// When false the loader is skipped and the candidate count is probed once.
    ///
    /// Default: `true`
    pub auto_scroll: bool,

    /// Maximum loader iterations.
    ///
    /// Default: `30`
    pub max_iterations: usize,

    /// Stop loading once this many candidates are present.
    ///
    /// Default: `None`
    pub target_count: Option<usize>,

    /// Consecutive non-growing iterations before the loader gives up.
    ///
    /// Default: `5`
    pub stall_threshold: usize,

    /// Consecutive non-growing iterations before the alternate growth tactic.
    ///
    /// Default: `3`
    pub alternate_tactic_after: usize,

    /// Selector of the content anchor scrolled into view by the alternate tactic.
    ///
    /// Default: `"article section"`
    pub anchor_selector: String,

    /// Labels of the explicit "load more" affordance.
    pub load_more_labels: Vec<String>,

    /// Treat a taller document as growth even when the count is unchanged.
    ///
    /// Default: `false`
    pub use_height_signal: bool,

    /// Settle delay after scrolling (milliseconds).
    ///
    /// Default: `2000`
    pub scroll_settle_ms: u64,

    /// Settle delay after a "load more" click (milliseconds).
    ///
    /// Default: `3000`
    pub load_more_settle_ms: u64,

    /// Settle delay after navigation (milliseconds).
    ///
    /// Default: `5000`
    pub post_navigate_settle_ms: u64,

    /// Settle delay after the readiness gate opens (milliseconds).
    ///
    /// Default: `3000`
    pub ready_settle_ms: u64,

    /// Longest wait at the readiness gate (milliseconds).
    ///
    /// When exceeded the harvest fails with an interaction timeout and the
    /// session is closed. `None` waits indefinitely.
    ///
    /// Default: `None`
    pub gate_timeout_ms: Option<u64>,

    /// Host the post URL must belong to (subdomains accepted).
    ///
    /// Default: `"instagram.com"`
    pub target_host: String,

    /// Longest post caption kept in metadata (characters).
    ///
    /// Default: `500`
    pub caption_limit: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            selector_sets: to_owned(selectors::ENHANCED_COMMENT_SELECTORS),
            link_selectors: to_owned(selectors::ENHANCED_LINK_SELECTORS),
            verified_selectors: to_owned(selectors::VERIFIED_SELECTORS),
            nearby_text_selector: selectors::NEARBY_TEXT_SELECTOR.to_string(),
            identity_levels: 6,
            verified_levels: 5,
            nearby_levels: 2,
            nearby_text_fallback: true,
            max_handle_len: 30,
            auto_scroll: true,
            max_iterations: 30,
            target_count: None,
            stall_threshold: 5,
            alternate_tactic_after: 3,
            anchor_selector: selectors::CONTENT_ANCHOR.to_string(),
            load_more_labels: to_owned(selectors::LOAD_MORE_LABELS),
            use_height_signal: false,
            scroll_settle_ms: 2000,
            load_more_settle_ms: 3000,
            post_navigate_settle_ms: 5000,
            ready_settle_ms: 3000,
            gate_timeout_ms: None,
            target_host: "instagram.com".to_string(),
            caption_limit: 500,
        }
    }
}

impl Options {
    /// The basic variant: four selector sets, link strategy only, five levels.
    #[must_use]
    pub fn basic() -> Self {
        Self {
            selector_sets: to_owned(selectors::BASIC_COMMENT_SELECTORS),
            link_selectors: to_owned(selectors::BASIC_LINK_SELECTORS),
            identity_levels: 5,
            nearby_text_fallback: false,
            max_iterations: 20,
            ..Self::default()
        }
    }

    /// Parse options from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    #[must_use]
    pub fn load_more_settle(&self) -> Duration {
        Duration::from_millis(self.load_more_settle_ms)
    }

    #[must_use]
    pub fn post_navigate_settle(&self) -> Duration {
        Duration::from_millis(self.post_navigate_settle_ms)
    }

    #[must_use]
    pub fn ready_settle(&self) -> Duration {
        Duration::from_millis(self.ready_settle_ms)
    }

    #[must_use]
    pub fn gate_timeout(&self) -> Option<Duration> {
        self.gate_timeout_ms.map(Duration::from_millis)
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
