//! Identity resolution.
//!
//! Attributes a content fragment to an author. Page facts around the fragment
//! are gathered once into a [`FragmentContext`]; the ordered strategies in
//! [`strategies`] then run over it without touching the page. When none of
//! them yields a handle, a synthetic identity keeps the fragment groupable.
//!
//! A failed per-fragment lookup is substituted with an empty result and
//! counted as degraded. Only a page fault that ends the session propagates.

pub mod strategies;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tracing::{debug, trace};

use crate::error::{PageError, PageResult};
use crate::extractor::HarvestSession;
use crate::options::Options;
use crate::page::{ElementHandle, Page};
use crate::result::{IdentitySource, ResolvedIdentity};

pub use strategies::IdentityStrategy;

/// Page facts around one fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentContext {
    /// The fragment's own text.
    pub text: String,
    /// Link hrefs under each ancestor level, nearest level first.
    pub ancestor_links: Vec<Vec<String>>,
    /// Texts of candidate elements near the fragment.
    pub nearby_texts: Vec<String>,
    /// A verified marker was found near the fragment.
    pub verified: bool,
    /// Some lookup failed and was substituted with an empty result.
    pub degraded: bool,
}

impl FragmentContext {
    /// Gather the context of `handle` from the page.
    ///
    /// Link levels are walked nearest first and the walk stops at the first
    /// level holding a usable identity link.
    ///
    /// # Errors
    ///
    /// Returns the page error only when it is fatal to the session.
    pub async fn gather(
        page: &dyn Page,
        handle: ElementHandle,
        text: &str,
        options: &Options,
    ) -> PageResult<Self> {
        let mut ctx = Self {
            text: text.to_string(),
            ..Self::default()
        };

        for level in 1..=options.identity_levels {
            let Some(ancestor) = ctx.soften(page.ancestor(handle, level).await)?.flatten() else {
                break;
            };
            let hrefs = ctx.links_under(page, ancestor, options).await?;
            let found = hrefs.iter().any(|href| {
                strategies::is_identity_link(href)
                    && strategies::handle_from_href(href, options.max_handle_len).is_some()
            });
            ctx.ancestor_links.push(hrefs);
            if found {
                break;
            }
        }

        if options.nearby_text_fallback {
            ctx.nearby_texts = ctx.texts_near(page, handle, options).await?;
        }

        ctx.verified = ctx.has_verified_marker(page, handle, options).await?;

        Ok(ctx)
    }

    async fn links_under(
        &mut self,
        page: &dyn Page,
        scope: ElementHandle,
        options: &Options,
    ) -> PageResult<Vec<String>> {
        let mut hrefs = Vec::new();
        for selector in &options.link_selectors {
            let links = self.soften(page.find_within(scope, selector).await)?.unwrap_or_default();
            for link in links {
                if let Some(href) = self.soften(page.attribute(link, "href").await)?.flatten() {
                    hrefs.push(href);
                }
            }
        }
        Ok(hrefs)
    }

    async fn texts_near(
        &mut self,
        page: &dyn Page,
        handle: ElementHandle,
        options: &Options,
    ) -> PageResult<Vec<String>> {
        let Some(scope) = self.soften(page.ancestor(handle, options.nearby_levels).await)?.flatten() else {
            return Ok(Vec::new());
        };
        let elements = self
            .soften(page.find_within(scope, &options.nearby_text_selector).await)?
            .unwrap_or_default();

        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            if let Some(text) = self.soften(page.text(element).await)? {
                texts.push(text);
            }
        }
        Ok(texts)
    }

    async fn has_verified_marker(
        &mut self,
        page: &dyn Page,
        handle: ElementHandle,
        options: &Options,
    ) -> PageResult<bool> {
        for level in 1..=options.verified_levels {
            let Some(ancestor) = self.soften(page.ancestor(handle, level).await)?.flatten() else {
                return Ok(false);
            };
            for selector in &options.verified_selectors {
                let markers = self.soften(page.find_within(ancestor, selector).await)?;
                if markers.is_some_and(|m| !m.is_empty()) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Turn a non-fatal lookup failure into `None`, marking the context degraded.
    fn soften<T>(&mut self, result: PageResult<T>) -> PageResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                trace!(error = %err, "identity lookup failed");
                self.degraded = true;
                Ok(None)
            }
        }
    }
}

/// Resolves the author of content fragments.
#[derive(Debug, Clone, Copy)]
pub struct IdentityResolver<'a> {
    options: &'a Options,
    strategies: &'static [(IdentitySource, IdentityStrategy)],
}

impl<'a> IdentityResolver<'a> {
    /// Resolver using the strategy chain the options call for.
    #[must_use]
    pub fn new(options: &'a Options) -> Self {
        let strategies = if options.nearby_text_fallback {
            strategies::ENHANCED
        } else {
            strategies::BASIC
        };
        Self { options, strategies }
    }

    /// Resolve the author of the fragment at `handle`.
    ///
    /// Resolution itself never fails: without a structural handle the
    /// fragment gets a synthetic identity unique within the session. Results
    /// are memoised per element, so a fragment matched by several selector
    /// sets resolves once.
    ///
    /// # Errors
    ///
    /// Returns a [`PageError`] only when the page session is gone.
    pub async fn resolve(
        &self,
        page: &dyn Page,
        handle: ElementHandle,
        text: &str,
        session: &mut HarvestSession,
    ) -> Result<ResolvedIdentity, PageError> {
        if let Some(identity) = session.cached_identity(handle) {
            return Ok(identity.clone());
        }

        let ctx = FragmentContext::gather(page, handle, text, self.options).await?;
        if ctx.degraded {
            session.note_degraded();
        }

        let identity = self.apply(&ctx).unwrap_or_else(|| {
            let synthetic = synthetic_handle(text, session.next_synthetic_seq());
            debug!(handle = %synthetic, "no structural identity, using synthetic");
            ResolvedIdentity {
                handle: synthetic,
                verified: ctx.verified,
                source: IdentitySource::Synthetic,
            }
        });

        session.remember_identity(handle, identity.clone());
        Ok(identity)
    }

    /// Run the strategy chain over a gathered context.
    #[must_use]
    pub fn apply(&self, ctx: &FragmentContext) -> Option<ResolvedIdentity> {
        self.strategies.iter().find_map(|(source, strategy)| {
            strategy(ctx, self.options).map(|handle| ResolvedIdentity {
                handle,
                verified: ctx.verified,
                source: *source,
            })
        })
    }
}

/// `user_<5-digit text hash>_<sequence>`.
///
/// The sequence makes the handle unique even for equal texts.
#[must_use]
pub fn synthetic_handle(text: &str, seq: u64) -> String {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    format!("user_{:05}_{seq}", hasher.finish() % 100_000)
}
