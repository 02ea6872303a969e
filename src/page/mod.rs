//! Page-automation abstraction.
//!
//! Defines the `Browser` and `Page` traits the engine drives. A browser driver
//! (Chromium over CDP, WebDriver, ...) lives outside this crate and implements
//! them; [`SnapshotPage`] implements them over static HTML snapshots.
//!
//! Lookups that find nothing return `Ok(None)`, `Ok(false)` or an empty list.
//! `Err` is reserved for genuine driver faults.

mod snapshot;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::PageResult;

pub use snapshot::{PageCall, SnapshotBrowser, SnapshotPage};

/// Opaque reference to an element, issued by a [`Page`].
///
/// Equal handles denote the same element within one page state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(pub u64);

/// Opens page sessions.
#[async_trait(?Send)]
pub trait Browser {
    /// Open a new page session (tab).
    async fn open(&self) -> PageResult<Box<dyn Page>>;
}

/// A single page session.
///
/// Sessions are driven by one harvest at a time; implementations may rely on
/// calls never overlapping.
#[async_trait(?Send)]
pub trait Page {
    /// Navigate to a URL.
    async fn navigate(&self, url: &str) -> PageResult<()>;

    /// The current URL.
    async fn current_url(&self) -> PageResult<String>;

    /// The document title.
    async fn title(&self) -> PageResult<String>;

    /// All elements matching a CSS selector, in document order.
    async fn find_all(&self, selector: &str) -> PageResult<Vec<ElementHandle>>;

    /// Descendants of `scope` matching a CSS selector, in document order.
    async fn find_within(&self, scope: ElementHandle, selector: &str) -> PageResult<Vec<ElementHandle>>;

    /// Rendered text of an element and its descendants.
    async fn text(&self, handle: ElementHandle) -> PageResult<String>;

    /// An attribute value, `None` when absent.
    async fn attribute(&self, handle: ElementHandle, name: &str) -> PageResult<Option<String>>;

    /// The element `levels` steps up the tree, `None` past the root.
    async fn ancestor(&self, handle: ElementHandle, levels: usize) -> PageResult<Option<ElementHandle>>;

    /// Scroll the viewport to the bottom of the document.
    async fn trigger_scroll_to_bottom(&self) -> PageResult<()>;

    /// Scroll the first element matching `selector` into view.
    ///
    /// Returns false when nothing matches.
    async fn scroll_into_view(&self, selector: &str) -> PageResult<bool>;

    /// Click the first visible element whose text contains any of `labels`.
    ///
    /// Returns false when no such element is visible.
    async fn click_if_visible(&self, labels: &[String]) -> PageResult<bool>;

    /// Total document height in pixels.
    async fn document_height(&self) -> PageResult<u64>;

    /// Let the page settle.
    async fn wait(&self, duration: Duration) -> PageResult<()> {
        tokio::time::sleep(duration).await;
        Ok(())
    }

    /// Close the session and release its resources.
    async fn close(self: Box<Self>) -> PageResult<()>;

    /// Release the session without awaiting.
    ///
    /// Called instead of [`Page::close`] when a harvest is dropped before it
    /// could close the session, e.g. by a caller-side timeout. Drivers that
    /// can only close asynchronously should schedule the close here.
    fn release(&self) {}
}
