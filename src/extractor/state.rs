//! Harvest session state.
//!
//! This module provides `HarvestSession`, the per-harvest context that carries
//! the accumulated items, the de-duplication keys and the identity memo across
//! one extraction pass. It replaces any process-wide state: two harvests never
//! share a session.

use std::collections::{HashMap, HashSet};

use crate::page::ElementHandle;
use crate::patterns::WHITESPACE_NORMALIZE;
use crate::result::{HarvestResult, HarvestStats, HarvestedItem, ResolvedIdentity};

/// Accumulated state of one extraction pass.
///
/// # Purpose
///
/// - **Items**: materialized in discovery order, unique by composite key
/// - **Identity memo**: one resolution per element, even when several
///   selector sets match it
/// - **Counters**: candidates seen, degraded lookups, synthetic sequence
#[derive(Debug, Default)]
pub struct HarvestSession {
    items: Vec<HarvestedItem>,
    seen_keys: HashSet<String>,
    identities: HashMap<ElementHandle, ResolvedIdentity>,
    synthetic_seq: u64,
    total_candidates: usize,
    degraded_lookups: usize,
}

impl HarvestSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity already resolved for this element in the current pass.
    #[must_use]
    pub fn cached_identity(&self, handle: ElementHandle) -> Option<&ResolvedIdentity> {
        self.identities.get(&handle)
    }

    pub fn remember_identity(&mut self, handle: ElementHandle, identity: ResolvedIdentity) {
        self.identities.insert(handle, identity);
    }

    /// Next synthetic sequence number.
    pub fn next_synthetic_seq(&mut self) -> u64 {
        let seq = self.synthetic_seq;
        self.synthetic_seq += 1;
        seq
    }

    pub fn note_degraded(&mut self) {
        self.degraded_lookups += 1;
    }

    /// Count fragments matched by one selector set.
    pub fn add_candidates(&mut self, count: usize) {
        self.total_candidates += count;
    }

    /// Materialize an item unless its composite key was seen.
    ///
    /// Returns true when the item was added.
    pub fn add_item(&mut self, identity: ResolvedIdentity, text: String) -> bool {
        if !self.seen_keys.insert(composite_key(&identity, &text)) {
            return false;
        }
        self.items.push(HarvestedItem::new(identity, text));
        true
    }

    /// Items materialized so far, in discovery order.
    #[must_use]
    pub fn items(&self) -> &[HarvestedItem] {
        &self.items
    }

    #[must_use]
    pub fn total_candidates(&self) -> usize {
        self.total_candidates
    }

    #[must_use]
    pub fn degraded_lookups(&self) -> usize {
        self.degraded_lookups
    }

    /// Items gathered so far, for reporting an aborted pass.
    #[must_use]
    pub fn into_items(self) -> Vec<HarvestedItem> {
        self.items
    }

    /// Order items by normalized handle and derive statistics.
    ///
    /// The sort is stable, so items of one identity keep discovery order.
    #[must_use]
    pub fn finish(self) -> HarvestResult {
        let mut items = self.items;
        items.sort_by_cached_key(|item| item.identity.normalized());
        let stats = HarvestStats::compute(&items, self.total_candidates, self.degraded_lookups);
        HarvestResult { items, stats }
    }
}

/// `lower(handle)_lower(collapsed text)`.
#[must_use]
pub fn composite_key(identity: &ResolvedIdentity, text: &str) -> String {
    let text = WHITESPACE_NORMALIZE.replace_all(text.trim(), " ").to_lowercase();
    format!("{}_{text}", identity.normalized())
}
