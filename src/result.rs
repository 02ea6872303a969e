//! Result types for harvest output.
//!
//! This module defines the structured output of a harvest: the de-duplicated
//! items, the derived statistics, and best-effort post metadata.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::loader::LoadOutcome;

/// How an identity was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IdentitySource {
    /// Trailing path segment of an ancestor's profile link.
    LinkStrategy,
    /// Handle-shaped text next to the fragment.
    NearbyTextStrategy,
    /// Generated by the engine; groups the item but names nobody.
    Synthetic,
}

/// The resolved author of a content fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedIdentity {
    /// Author handle, original case, without a leading `@`.
    pub handle: String,
    /// Whether a verified marker was found near the fragment.
    pub verified: bool,
    pub source: IdentitySource,
}

impl ResolvedIdentity {
    /// Lower-cased handle used for grouping and ordering.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.handle.to_lowercase()
    }

    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.source == IdentitySource::Synthetic
    }

    /// Profile URL of a structural identity.
    #[must_use]
    pub fn profile_url(&self) -> Option<String> {
        if self.is_synthetic() {
            None
        } else {
            Some(format!("https://instagram.com/{}", self.handle))
        }
    }
}

/// A single harvested comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarvestedItem {
    pub identity: ResolvedIdentity,
    /// Trimmed comment text.
    pub text: String,
    /// When the item was materialized.
    pub discovered_at: DateTime<Utc>,
    /// Length of `text` in characters.
    pub text_length: usize,
}

impl HarvestedItem {
    #[must_use]
    pub fn new(identity: ResolvedIdentity, text: String) -> Self {
        let text_length = text.chars().count();
        Self {
            identity,
            text,
            discovered_at: Utc::now(),
            text_length,
        }
    }
}

/// Summary statistics of one extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HarvestStats {
    /// Fragments matched across all selector sets, repeats included.
    pub total_candidates: usize,
    /// Distinct normalized handles among the items.
    pub unique_identities: usize,
    /// Items that survived validation and de-duplication.
    pub valid_items: usize,
    /// `valid_items / total_candidates`, 0 without candidates.
    pub efficiency: f64,
    /// Mean `text_length`, 0 without items.
    pub avg_text_length: f64,
    /// Items whose author carries a verified marker.
    pub verified_items: usize,
    /// Items grouped under a synthetic identity.
    pub synthetic_identities: usize,
    /// Per-fragment lookups that failed and were substituted with defaults.
    pub degraded_lookups: usize,
}

impl HarvestStats {
    /// Derive statistics from the final item list.
    #[must_use]
    pub fn compute(items: &[HarvestedItem], total_candidates: usize, degraded_lookups: usize) -> Self {
        let valid_items = items.len();
        let unique_identities = items
            .iter()
            .map(|item| item.identity.normalized())
            .collect::<HashSet<_>>()
            .len();

        let efficiency = if total_candidates == 0 {
            0.0
        } else {
            valid_items as f64 / total_candidates as f64
        };

        let avg_text_length = if valid_items == 0 {
            0.0
        } else {
            items.iter().map(|item| item.text_length).sum::<usize>() as f64 / valid_items as f64
        };

        Self {
            total_candidates,
            unique_identities,
            valid_items,
            efficiency,
            avg_text_length,
            verified_items: items.iter().filter(|item| item.identity.verified).count(),
            synthetic_identities: items.iter().filter(|item| item.identity.is_synthetic()).count(),
            degraded_lookups,
        }
    }
}

/// Items and statistics of one extraction pass.
///
/// Items are ordered by normalized handle; equal handles keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HarvestResult {
    pub items: Vec<HarvestedItem>,
    pub stats: HarvestStats,
}

/// Kind of post being harvested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum PostKind {
    #[default]
    Unknown,
    Post,
    Reel,
}

/// Best-effort metadata about the harvested post.
///
/// Every field falls back to a default when its lookup fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostMetadata {
    /// Post author handle, `"unknown"` when not found.
    pub author: String,
    /// Caption, truncated with `...` past the configured limit.
    pub caption: String,
    pub likes: u64,
    pub url: String,
    pub post_id: Option<String>,
    pub kind: PostKind,
    pub collected_at: DateTime<Utc>,
    pub page_title: String,
}

impl Default for PostMetadata {
    fn default() -> Self {
        Self {
            author: "unknown".to_string(),
            caption: String::new(),
            likes: 0,
            url: String::new(),
            post_id: None,
            kind: PostKind::Unknown,
            collected_at: Utc::now(),
            page_title: String::new(),
        }
    }
}

/// A completed harvest.
#[derive(Debug, Clone, Serialize)]
pub struct Harvest {
    pub result: HarvestResult,
    pub post: PostMetadata,
    /// Loader outcome; `None` when auto-scroll was disabled.
    pub load: Option<LoadOutcome>,
    /// Non-fatal issues such as metadata lookups that fell back to defaults.
    pub warnings: Vec<String>,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

mod duration_ms {
    use std::time::Duration;

    use serde::Serializer;

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u128(value.as_millis())
    }
}
