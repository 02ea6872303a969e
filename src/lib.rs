//! # rs-harvest
//!
//! Heuristic comment harvesting for dynamically loading social posts.
//!
//! Given a page session on a post, the engine grows the comment thread until
//! it stops loading, extracts candidate fragments through several redundant
//! selector sets, filters UI noise, attributes each fragment to an author by
//! walking the tree around it, and returns a de-duplicated, stably ordered
//! item list with summary statistics.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_harvest::{harvest, Immediate, SnapshotBrowser};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), rs_harvest::HarvestFailure> {
//! let browser = SnapshotBrowser::new([r#"<article><ul><li><div>
//!     <a href="/alice/">alice</a>
//!     <div><div><span>Great giveaway!</span></div></div>
//! </div></li></ul></article>"#]);
//!
//! let harvest = harvest(&browser, &Immediate, "https://www.instagram.com/p/ABC123/").await?;
//! for item in &harvest.result.items {
//!     println!("@{}: {}", item.identity.handle, item.text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Incremental loading**: scroll / "load more" until the count converges
//! - **Redundant extraction**: several selector sets per layout variant
//! - **Identity resolution**: ancestor links, nearby text, synthetic fallback
//! - **Partial results**: failures hand back the items gathered so far
//!
//! The page itself is driven through the [`Browser`] and [`Page`] traits.
//! [`SnapshotBrowser`] implements them over static HTML snapshots.

mod error;
mod harvest;
mod options;
mod patterns;
mod result;

/// DOM helpers over `dom_query` used by the snapshot page.
pub mod dom;

/// Page-automation traits and the snapshot implementation.
pub mod page;

/// Selector tables for post and comment layouts.
pub mod selectors;

/// Classification of text fragments as content or UI noise.
pub mod validator;

/// Author resolution for content fragments.
pub mod identity;

/// Extraction pass and per-harvest session state.
pub mod extractor;

/// Convergence loop growing the page.
pub mod loader;

/// Readiness gates between navigation and harvesting.
pub mod gate;

/// Best-effort post metadata.
pub mod metadata;

/// Post URL validation and host checks.
pub mod url_utils;

// Public API - re-exports
pub use error::{Error, FailureKind, GateError, HarvestFailure, PageError, PageResult, Result};
pub use extractor::{Aggregator, HarvestSession};
pub use gate::{ElementGate, Immediate, LineGate, ReadinessGate, ReadySignal, SignalGate};
pub use harvest::Harvester;
pub use identity::{FragmentContext, IdentityResolver};
pub use loader::{LoadOutcome, LoadPhase, Loader, LoaderState};
pub use options::Options;
pub use page::{Browser, ElementHandle, Page, PageCall, SnapshotBrowser, SnapshotPage};
pub use result::{
    Harvest, HarvestResult, HarvestStats, HarvestedItem, IdentitySource, PostKind, PostMetadata,
    ResolvedIdentity,
};
pub use validator::is_valid_content;

/// Harvests a post using default options.
///
/// # Arguments
///
/// * `browser` - Opens the page session
/// * `gate` - Suspension point before harvesting starts
/// * `url` - The post or reel URL
///
/// # Returns
///
/// Returns `Ok(Harvest)` with the items, statistics and post metadata.
/// Returns a `HarvestFailure` carrying any partial items otherwise.
#[allow(clippy::missing_errors_doc)]
pub async fn harvest(
    browser: &dyn Browser,
    gate: &dyn ReadinessGate,
    url: &str,
) -> std::result::Result<Harvest, HarvestFailure> {
    harvest_with_options(browser, gate, url, &Options::default()).await
}

/// Harvests a post with custom options.
///
/// # Example
///
/// ```rust
/// use rs_harvest::{harvest_with_options, Immediate, Options, SnapshotBrowser};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let browser = SnapshotBrowser::new(["<html></html>"]);
/// let options = Options {
///     max_iterations: 50,
///     target_count: Some(500),
///     ..Options::basic()
/// };
///
/// let failure = harvest_with_options(&browser, &Immediate, "https://example.com/p/1", &options)
///     .await
///     .unwrap_err();
/// assert_eq!(failure.kind, rs_harvest::FailureKind::InvalidInput);
/// assert_eq!(browser.opened_sessions(), 0);
/// # }
/// ```
#[allow(clippy::missing_errors_doc)]
pub async fn harvest_with_options(
    browser: &dyn Browser,
    gate: &dyn ReadinessGate,
    url: &str,
    options: &Options,
) -> std::result::Result<Harvest, HarvestFailure> {
    Harvester::new(options.clone()).harvest(browser, gate, url).await
}
