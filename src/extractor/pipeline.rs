//! Extraction pipeline.
//!
//! Runs every selector set over the current page state, unions the matched
//! fragments in set order, and pushes each one through validation, identity
//! resolution and composite-key de-duplication.

use tracing::{debug, info, trace, warn};

use crate::error::{PageError, PageResult};
use crate::extractor::HarvestSession;
use crate::identity::IdentityResolver;
use crate::options::Options;
use crate::page::Page;
use crate::result::HarvestResult;
use crate::validator::is_valid_content;

/// Extraction aggregator.
///
/// # Example
///
/// ```rust
/// use rs_harvest::{Aggregator, Options, SnapshotPage};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), rs_harvest::PageError> {
/// let page = SnapshotPage::new([r#"<article><ul><li><div>
///     <a href="/alice/">alice</a>
///     <div><div><span>Great giveaway!</span></div></div>
/// </div></li></ul></article>"#]);
///
/// let options = Options::default();
/// let result = Aggregator::new(&options).extract(&page).await?;
/// assert_eq!(result.items[0].identity.handle, "alice");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'a> {
    options: &'a Options,
    resolver: IdentityResolver<'a>,
}

impl<'a> Aggregator<'a> {
    #[must_use]
    pub fn new(options: &'a Options) -> Self {
        Self {
            options,
            resolver: IdentityResolver::new(options),
        }
    }

    /// Number of fragments currently matched, summed over all selector sets.
    ///
    /// No validation or resolution is done. A selector set that fails to run
    /// counts as zero.
    ///
    /// # Errors
    ///
    /// Returns the page error only when it is fatal to the session.
    pub async fn count_candidates(&self, page: &dyn Page) -> PageResult<usize> {
        let mut count = 0;
        for selector in &self.options.selector_sets {
            match page.find_all(selector).await {
                Ok(handles) => count += handles.len(),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => trace!(selector = %selector, error = %err, "candidate probe failed"),
            }
        }
        Ok(count)
    }

    /// Run one extraction pass into a fresh session.
    ///
    /// # Errors
    ///
    /// Returns the page error when the session dies mid-pass. Use
    /// [`Aggregator::extract_into`] to keep the items gathered before that.
    pub async fn extract(&self, page: &dyn Page) -> PageResult<HarvestResult> {
        let mut session = HarvestSession::new();
        self.extract_into(page, &mut session).await?;
        Ok(session.finish())
    }

    /// Run one extraction pass, accumulating into `session`.
    ///
    /// Per-fragment failures skip the fragment and count as degraded lookups.
    ///
    /// # Errors
    ///
    /// Returns the page error when it is fatal to the session; items gathered
    /// so far stay in `session`.
    pub async fn extract_into(&self, page: &dyn Page, session: &mut HarvestSession) -> Result<(), PageError> {
        for selector in &self.options.selector_sets {
            let handles = match page.find_all(selector).await {
                Ok(handles) => handles,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    debug!(selector = %selector, error = %err, "selector set failed, skipping");
                    session.note_degraded();
                    continue;
                }
            };
            session.add_candidates(handles.len());

            for handle in handles {
                let text = match page.text(handle).await {
                    Ok(text) => text,
                    Err(err) if err.is_fatal() => return Err(err),
                    Err(err) => {
                        debug!(error = %err, "fragment text unavailable, skipping");
                        session.note_degraded();
                        continue;
                    }
                };
                let text = text.trim();

                if !is_valid_content(text) {
                    trace!(text, "not content");
                    continue;
                }

                let identity = self.resolver.resolve(page, handle, text, session).await?;
                if !session.add_item(identity, text.to_string()) {
                    trace!(text, "duplicate item");
                }
            }
        }

        info!(
            candidates = session.total_candidates(),
            items = session.items().len(),
            degraded = session.degraded_lookups(),
            "extraction pass complete"
        );
        if session.degraded_lookups() > 0 {
            warn!(degraded = session.degraded_lookups(), "some lookups failed and fell back to defaults");
        }
        Ok(())
    }
}
