//! # engine::reconcile
//!
//! **Reconciliation** — turns the two raw upstream payloads into the working
//! item set:
//!
//! ```text
//! RawListing[] ──normalize──▶ Item[] ──join(projections)──▶ Item[] ──dedup(id)──▶ Item[]
//! ```
//!
//! Dedup is keyed by numeric id. Keying by display name would merge distinct
//! items that happen to share a name, so it is not offered.

use std::collections::HashMap;

use tracing::warn;

use crate::models::coerce::{coerce_f64, coerce_i64};
use crate::models::{Item, ItemId, ProjectionTable, RawListing, NOT_PROJECTED, PROJECTED_SIGNAL_INDEX};

// ─── Result ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciled {
    /// One item per id, in first-seen order.
    pub items: Vec<Item>,
    /// Raw records received from the listings source.
    pub raw_count: usize,
    /// Raw records dropped during normalization.
    pub skipped: usize,
}

/// Run normalize → join → dedup over one pair of source payloads.
pub fn reconcile(raw: Vec<RawListing>, projections: &ProjectionTable) -> Reconciled {
    let raw_count = raw.len();

    let normalized: Vec<Item> = raw.iter().filter_map(normalize).collect();
    let skipped = raw_count - normalized.len();
    if skipped > 0 {
        warn!(skipped, raw_count, "listing records dropped during normalization");
    }

    let joined = normalized.into_iter().map(|mut item| {
        item.is_projected = projection_flag(projections, item.id);
        item
    });

    Reconciled { items: dedup_by_min_price(joined), raw_count, skipped }
}

// ─── Normalize ────────────────────────────────────────────────────────────────

/// Coerce one raw record into an [`Item`].
///
/// Returns `None` when the id is missing, the name is not a string, or any
/// numeric field is not a finite, non-negative number. The name is carried
/// over verbatim.
pub fn normalize(raw: &RawListing) -> Option<Item> {
    let id = raw.limited_id.as_ref().and_then(coerce_i64)?;
    let name = raw.limited_name.as_str()?.to_owned();
    let reference_value = coerce_f64(&raw.rap).filter(|v| *v >= 0.0)?;
    let ask_price = coerce_f64(&raw.price).filter(|v| *v >= 0.0)?;

    Some(Item {
        id,
        name,
        reference_value,
        ask_price,
        is_projected: None,
    })
}

// ─── Join ─────────────────────────────────────────────────────────────────────

/// `None` without a projection entry. With an entry, projected unless the
/// signal slot holds the "not applicable" sentinel; a missing or non-numeric
/// slot counts as not projected.
pub fn projection_flag(projections: &ProjectionTable, id: ItemId) -> Option<bool> {
    let signals = projections.get(&id)?;
    let projected = matches!(
        signals.get(PROJECTED_SIGNAL_INDEX),
        Some(Some(signal)) if *signal != NOT_PROJECTED
    );
    Some(projected)
}

// ─── Dedup ────────────────────────────────────────────────────────────────────

/// Keep one item per id: the strictly cheapest ask, first seen on ties.
///
/// Output order is the order in which each id first appeared, so "no sort"
/// views stay deterministic across refreshes of the same catalog.
pub fn dedup_by_min_price(items: impl IntoIterator<Item = Item>) -> Vec<Item> {
    let mut slot_by_id: HashMap<ItemId, usize> = HashMap::new();
    let mut kept: Vec<Item> = Vec::new();

    for item in items {
        match slot_by_id.get(&item.id) {
            Some(&slot) => {
                if item.ask_price < kept[slot].ask_price {
                    kept[slot] = item;
                }
            }
            None => {
                slot_by_id.insert(item.id, kept.len());
                kept.push(item);
            }
        }
    }

    kept
}

// ─── Tests ────────────────────────────────────────────────────────────────────
