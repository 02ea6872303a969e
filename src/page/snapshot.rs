//! Page sessions over static HTML snapshots.
//!
//! A `SnapshotPage` holds a sequence of parsed documents standing for the
//! successive states of a dynamically loading page. Scrolling to the bottom,
//! or clicking a visible "load more" affordance, reveals the next snapshot.
//! Waiting is a no-op since nothing loads in the background.
//!
//! Driver faults can be injected per call kind to exercise degraded paths.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dom_query::{Document, NodeId, NodeRef, Selection};

use crate::dom;
use crate::error::{PageError, PageResult};
use crate::page::{Browser, ElementHandle, Page};
use crate::selectors::CLICKABLE_SELECTOR;

/// Approximate rendered height of one element, for `document_height`.
const ELEMENT_HEIGHT_PX: u64 = 24;

/// Kinds of [`Page`] lookup that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageCall {
    FindAll,
    FindWithin,
    Text,
    Attribute,
    Ancestor,
}

#[derive(Debug, Default)]
struct SnapshotState {
    cursor: usize,
    url: String,
    /// Issued handles: handle value indexes this list.
    handles: Vec<(usize, NodeId)>,
    issued: HashMap<(usize, NodeId), ElementHandle>,
    calls: usize,
    scrolls: usize,
    clicks: usize,
    anchor_scrolls: usize,
    waited: Duration,
}

/// A [`Page`] backed by static HTML snapshots.
///
/// # Example
///
/// ```rust
/// use rs_harvest::{Page, SnapshotPage};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), rs_harvest::PageError> {
/// let page = SnapshotPage::new(["<article><ul><li><span>hi there</span></li></ul></article>"]);
/// let spans = page.find_all("article span").await?;
/// assert_eq!(page.text(spans[0]).await?, "hi there");
/// # Ok(())
/// # }
/// ```
pub struct SnapshotPage {
    snapshots: Vec<Document>,
    state: RefCell<SnapshotState>,
    fail_after: Option<usize>,
    faults: HashSet<PageCall>,
    closed: Option<Arc<AtomicUsize>>,
}

impl SnapshotPage {
    /// Build a page from successive HTML states; the first is shown initially.
    pub fn new<I, S>(snapshots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut snapshots: Vec<Document> = snapshots
            .into_iter()
            .map(|html| dom::parse(html.as_ref()))
            .collect();
        if snapshots.is_empty() {
            snapshots.push(dom::parse(""));
        }
        Self {
            snapshots,
            state: RefCell::new(SnapshotState::default()),
            fail_after: None,
            faults: HashSet::new(),
            closed: None,
        }
    }

    /// Fail every call after the first `calls` with [`PageError::Closed`].
    #[must_use]
    pub fn fail_after(mut self, calls: usize) -> Self {
        self.fail_after = Some(calls);
        self
    }

    /// Fail every `call` with a non-fatal [`PageError::Script`].
    #[must_use]
    pub fn failing(mut self, call: PageCall) -> Self {
        self.faults.insert(call);
        self
    }

    /// Index of the snapshot currently shown.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.state.borrow().cursor
    }

    #[must_use]
    pub fn scrolls(&self) -> usize {
        self.state.borrow().scrolls
    }

    #[must_use]
    pub fn clicks(&self) -> usize {
        self.state.borrow().clicks
    }

    /// How often the alternate tactic scrolled an anchor into view.
    #[must_use]
    pub fn anchor_scrolls(&self) -> usize {
        self.state.borrow().anchor_scrolls
    }

    /// Total settle time requested through [`Page::wait`].
    #[must_use]
    pub fn waited(&self) -> Duration {
        self.state.borrow().waited
    }

    fn document(&self) -> &Document {
        let cursor = self.state.borrow().cursor;
        &self.snapshots[cursor]
    }

    fn check_call(&self) -> PageResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        match self.fail_after {
            Some(limit) if state.calls > limit => Err(PageError::Closed),
            _ => Ok(()),
        }
    }

    fn check_lookup(&self, call: PageCall) -> PageResult<()> {
        self.check_call()?;
        if self.faults.contains(&call) {
            return Err(PageError::Script(format!("{call:?} failed")));
        }
        Ok(())
    }

    fn advance(&self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.cursor + 1 < self.snapshots.len() {
            state.cursor += 1;
            true
        } else {
            false
        }
    }

    fn issue(&self, node: &NodeRef) -> ElementHandle {
        let mut state = self.state.borrow_mut();
        let key = (state.cursor, node.id);
        if let Some(handle) = state.issued.get(&key) {
            return *handle;
        }
        let handle = ElementHandle(state.handles.len() as u64);
        state.handles.push(key);
        state.issued.insert(key, handle);
        handle
    }

    fn issue_all(&self, selection: Option<Selection>) -> Vec<ElementHandle> {
        selection.map_or_else(Vec::new, |sel| {
            sel.nodes()
                .iter()
                .filter(|node| node.is_element())
                .map(|node| self.issue(node))
                .collect()
        })
    }

    fn resolve(&self, handle: ElementHandle) -> PageResult<NodeRef<'_>> {
        let (snapshot, id) = {
            let state = self.state.borrow();
            let index = usize::try_from(handle.0).map_err(|_| PageError::StaleHandle)?;
            *state.handles.get(index).ok_or(PageError::StaleHandle)?
        };
        if snapshot != self.cursor() {
            return Err(PageError::StaleHandle);
        }
        // Ids are only ever issued from this snapshot's own tree
        Ok(NodeRef::new(id, &self.snapshots[snapshot].tree))
    }
}

#[async_trait(?Send)]
impl Page for SnapshotPage {
    async fn navigate(&self, url: &str) -> PageResult<()> {
        self.check_call()?;
        let mut state = self.state.borrow_mut();
        state.url = url.to_string();
        state.cursor = 0;
        Ok(())
    }

    async fn current_url(&self) -> PageResult<String> {
        self.check_call()?;
        Ok(self.state.borrow().url.clone())
    }

    async fn title(&self) -> PageResult<String> {
        self.check_call()?;
        Ok(dom::normalized_text(&self.document().select("title")))
    }

    async fn find_all(&self, selector: &str) -> PageResult<Vec<ElementHandle>> {
        self.check_lookup(PageCall::FindAll)?;
        Ok(self.issue_all(self.document().try_select(selector)))
    }

    async fn find_within(&self, scope: ElementHandle, selector: &str) -> PageResult<Vec<ElementHandle>> {
        self.check_lookup(PageCall::FindWithin)?;
        let scope = Selection::from(self.resolve(scope)?);
        Ok(self.issue_all(scope.try_select(selector)))
    }

    async fn text(&self, handle: ElementHandle) -> PageResult<String> {
        self.check_lookup(PageCall::Text)?;
        let node = self.resolve(handle)?;
        Ok(dom::normalized_text(&Selection::from(node)))
    }

    async fn attribute(&self, handle: ElementHandle, name: &str) -> PageResult<Option<String>> {
        self.check_lookup(PageCall::Attribute)?;
        let node = self.resolve(handle)?;
        Ok(dom::get_attribute(&Selection::from(node), name))
    }

    async fn ancestor(&self, handle: ElementHandle, levels: usize) -> PageResult<Option<ElementHandle>> {
        self.check_lookup(PageCall::Ancestor)?;
        let mut node = self.resolve(handle)?;
        for _ in 0..levels {
            match node.parent() {
                Some(parent) if parent.is_element() => node = parent,
                _ => return Ok(None),
            }
        }
        Ok(Some(self.issue(&node)))
    }

    async fn trigger_scroll_to_bottom(&self) -> PageResult<()> {
        self.check_call()?;
        self.state.borrow_mut().scrolls += 1;
        self.advance();
        Ok(())
    }

    async fn scroll_into_view(&self, selector: &str) -> PageResult<bool> {
        self.check_call()?;
        let found = self
            .document()
            .try_select(selector)
            .is_some_and(|sel| sel.exists());
        if found {
            self.state.borrow_mut().anchor_scrolls += 1;
        }
        Ok(found)
    }

    async fn click_if_visible(&self, labels: &[String]) -> PageResult<bool> {
        self.check_call()?;
        let Some(candidates) = self.document().try_select(CLICKABLE_SELECTOR) else {
            return Ok(false);
        };
        let clicked = candidates.nodes().iter().any(|node| {
            let sel = Selection::from(*node);
            let text = dom::normalized_text(&sel);
            dom::is_visible(&sel) && labels.iter().any(|label| text.contains(label.as_str()))
        });
        if clicked {
            self.state.borrow_mut().clicks += 1;
            self.advance();
        }
        Ok(clicked)
    }

    async fn document_height(&self) -> PageResult<u64> {
        self.check_call()?;
        Ok(self.document().select("*").nodes().len() as u64 * ELEMENT_HEIGHT_PX)
    }

    async fn wait(&self, duration: Duration) -> PageResult<()> {
        self.check_call()?;
        self.state.borrow_mut().waited += duration;
        Ok(())
    }

    async fn close(self: Box<Self>) -> PageResult<()> {
        self.release();
        Ok(())
    }

    fn release(&self) {
        if let Some(counter) = &self.closed {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// A [`Browser`] that opens [`SnapshotPage`] sessions over the same snapshots.
#[derive(Debug, Clone, Default)]
pub struct SnapshotBrowser {
    snapshots: Vec<String>,
    fail_after: Option<usize>,
    faults: Vec<PageCall>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl SnapshotBrowser {
    pub fn new<I, S>(snapshots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            snapshots: snapshots.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Sessions fail with [`PageError::Closed`] after `calls` page calls.
    #[must_use]
    pub fn fail_after(mut self, calls: usize) -> Self {
        self.fail_after = Some(calls);
        self
    }

    /// Sessions fail every `call` with a non-fatal [`PageError::Script`].
    #[must_use]
    pub fn failing(mut self, call: PageCall) -> Self {
        self.faults.push(call);
        self
    }

    /// Number of sessions opened so far.
    #[must_use]
    pub fn opened_sessions(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of sessions closed so far.
    #[must_use]
    pub fn closed_sessions(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait(?Send)]
impl Browser for SnapshotBrowser {
    async fn open(&self) -> PageResult<Box<dyn Page>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let mut page = SnapshotPage::new(&self.snapshots);
        page.fail_after = self.fail_after;
        page.faults = self.faults.iter().copied().collect();
        page.closed = Some(Arc::clone(&self.closed));
        Ok(Box::new(page))
    }
}
