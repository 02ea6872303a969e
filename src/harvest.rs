//! Session orchestration.
//!
//! A harvest validates the post URL, opens a page session, navigates, waits at
//! the readiness gate, collects post metadata, grows the page, extracts and
//! packages the result. The session is closed exactly once on every path
//! after it was opened, and a failure still hands back the items gathered
//! before it.

use std::time::Instant;

use tracing::{info, warn};

use crate::error::{Error, HarvestFailure, PageError, Result};
use crate::extractor::{Aggregator, HarvestSession};
use crate::gate::ReadinessGate;
use crate::loader::{LoadOutcome, Loader};
use crate::metadata::extract_post_metadata;
use crate::options::Options;
use crate::page::{Browser, Page};
use crate::result::{Harvest, PostMetadata};
use crate::url_utils::{is_on_host, validate_post_url, PostUrl};

/// Runs harvests with a fixed set of options.
///
/// # Example
///
/// ```rust
/// use rs_harvest::{Harvester, Immediate, Options, SnapshotBrowser};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), rs_harvest::HarvestFailure> {
/// let browser = SnapshotBrowser::new([r#"<article><ul><li><div>
///     <a href="/alice/">alice</a>
///     <div><div><span>Pick me please!!</span></div></div>
/// </div></li></ul></article>"#]);
///
/// let harvester = Harvester::new(Options { auto_scroll: false, ..Options::default() });
/// let harvest = harvester
///     .harvest(&browser, &Immediate, "https://www.instagram.com/p/ABC123/")
///     .await?;
///
/// assert_eq!(harvest.result.items[0].identity.handle, "alice");
/// assert_eq!(browser.closed_sessions(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Harvester {
    options: Options,
}

/// Releases a page session that is still open when a harvest is dropped.
struct ReleaseOnDrop<'a> {
    page: Option<&'a dyn Page>,
}

impl<'a> ReleaseOnDrop<'a> {
    fn new(page: &'a dyn Page) -> Self {
        Self { page: Some(page) }
    }

    /// The harvest reached its own close.
    fn disarm(mut self) {
        self.page = None;
    }
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            warn!("harvest dropped with the page session open, releasing it");
            page.release();
        }
    }
}

/// What the staged part of a harvest produces besides the items.
struct Staged {
    post: PostMetadata,
    load: Option<LoadOutcome>,
    warnings: Vec<String>,
}

impl Harvester {
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Harvest the comments of the post at `url`.
    ///
    /// Suspends at `gate` for at most `Options::gate_timeout_ms`, or for as
    /// long as it takes when unset. A future dropped mid-harvest (say by a
    /// caller-side timeout) still releases the page session.
    ///
    /// # Errors
    ///
    /// A [`HarvestFailure`] whose `partial_items` hold what was gathered before
    /// the failure. Invalid URLs fail before any session is opened.
    pub async fn harvest(
        &self,
        browser: &dyn Browser,
        gate: &dyn ReadinessGate,
        url: &str,
    ) -> std::result::Result<Harvest, HarvestFailure> {
        let started = Instant::now();

        let post = validate_post_url(url, &self.options.target_host).map_err(|err| {
            warn!(error = %err, "rejected post URL");
            HarvestFailure::new(&err, Vec::new())
        })?;
        info!(post_id = %post.post_id, kind = ?post.kind, "starting harvest");

        let page = browser
            .open()
            .await
            .map_err(|err| HarvestFailure::new(&Error::from(err), Vec::new()))?;

        let guard = ReleaseOnDrop::new(page.as_ref());
        let mut session = HarvestSession::new();
        let staged = self.run(page.as_ref(), gate, &post, &mut session).await;
        guard.disarm();

        if let Err(err) = page.close().await {
            warn!(error = %err, "failed to close page session");
        }

        match staged {
            Ok(staged) => {
                let result = session.finish();
                let elapsed = started.elapsed();
                info!(
                    items = result.stats.valid_items,
                    identities = result.stats.unique_identities,
                    candidates = result.stats.total_candidates,
                    elapsed_ms = elapsed.as_millis(),
                    "harvest complete"
                );
                Ok(Harvest {
                    result,
                    post: staged.post,
                    load: staged.load,
                    warnings: staged.warnings,
                    elapsed,
                })
            }
            Err(err) => {
                let failure = HarvestFailure::new(&err, session.into_items());
                warn!(%failure, "harvest failed");
                Err(failure)
            }
        }
    }

    async fn run(
        &self,
        page: &dyn Page,
        gate: &dyn ReadinessGate,
        post: &PostUrl,
        session: &mut HarvestSession,
    ) -> Result<Staged> {
        let options = &self.options;

        page.navigate(post.url.as_str()).await?;
        page.wait(options.post_navigate_settle()).await?;

        match options.gate_timeout() {
            Some(limit) => tokio::time::timeout(limit, gate.wait_ready(page))
                .await
                .map_err(|_| {
                    Error::InteractionTimeout(format!("page not ready after {}ms", limit.as_millis()))
                })??,
            None => gate.wait_ready(page).await?,
        }
        info!("page ready");
        page.wait(options.ready_settle()).await?;

        let current = page.current_url().await?;
        if !is_on_host(&current, &options.target_host) {
            return Err(Error::Session(PageError::Navigation(format!(
                "page left {} for {current}",
                options.target_host
            ))));
        }

        let (post, warnings) = extract_post_metadata(page, post, options).await?;

        let load = if options.auto_scroll {
            Some(Loader::new(options).run(page).await)
        } else {
            let count = Aggregator::new(options).count_candidates(page).await?;
            info!(count, "auto-scroll disabled, extracting current page");
            None
        };

        Aggregator::new(options).extract_into(page, session).await?;

        Ok(Staged { post, load, warnings })
    }
}
