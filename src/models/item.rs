//! # models::item
//!
//! Defines [`Item`], one reconciled catalog entry, together with the raw
//! shapes the two upstream sources hand us before normalization.
//!
//! `Item` is flat and cheap to clone: the published snapshot is shared with
//! every reader through an `Arc`, and views clone only the entries they keep.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Numeric catalog identifier. Stable across fetches.
pub type ItemId = i64;

/// Units of reference value the rate is quoted against.
pub const RATE_UNIT: f64 = 1000.0;

// ─── Item ─────────────────────────────────────────────────────────────────────

/// A single tradable item after normalization, join and dedup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,

    /// Display label. Not unique: the catalog itself carries duplicates.
    pub name: String,

    /// Slow-moving valuation ("recent average price").
    pub reference_value: f64,

    /// Current listed price, in the listing's external currency.
    pub ask_price: f64,

    /// `None` when the projection table has no entry for this id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_projected: Option<bool>,
}

impl Item {
    /// Ask price per 1000 units of reference value. Lower is a better deal.
    ///
    /// Never NaN: a zero (or negative) reference value yields `+inf`, which
    /// fails every `rate <= max_rate` check and sorts last.
    #[inline]
    pub fn rate(&self) -> f64 {
        if self.reference_value <= 0.0 {
            return f64::INFINITY;
        }
        self.ask_price / (self.reference_value / RATE_UNIT)
    }

    #[inline]
    pub fn projected(&self) -> bool {
        self.is_projected.unwrap_or(false)
    }
}

// ─── Raw Listing ──────────────────────────────────────────────────────────────

/// One record from the listings source, exactly as delivered.
///
/// Numbers arrive either as JSON numbers or as numeric strings depending on
/// the listing, and names are occasionally `null`, so every field stays as
/// [`Value`] until normalization decides whether the record is usable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawListing {
    #[serde(default)]
    pub limited_id: Option<Value>,
    #[serde(default)]
    pub limited_name: Value,
    #[serde(default)]
    pub rap: Value,
    #[serde(default)]
    pub price: Value,
}

// ─── Projection Table ─────────────────────────────────────────────────────────

/// Position of the "projected" signal inside a projection vector.
pub const PROJECTED_SIGNAL_INDEX: usize = 7;

/// Sentinel stored at [`PROJECTED_SIGNAL_INDEX`] when an item is not projected.
pub const NOT_PROJECTED: i64 = -1;

/// Per-item signal vectors from the projection source, keyed by item id.
///
/// Vectors are positional and mix names with numbers upstream; non-numeric
/// slots are kept as `None` so indices never shift.
pub type ProjectionTable = HashMap<ItemId, Vec<Option<i64>>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn item(reference_value: f64, ask_price: f64) -> Item {
        Item {
            id: 1,
            name: "Valkyrie Helm".into(),
            reference_value,
            ask_price,
            is_projected: None,
        }
    }

    #[test]
    fn test_rate_per_thousand() {
        assert_eq!(item(1000.0, 4.0).rate(), 4.0);
        assert_eq!(item(20_000.0, 50.0).rate(), 2.5);
    }

    #[test]
    fn test_rate_zero_reference_is_infinite() {
        let rate = item(0.0, 4.0).rate();
        assert!(rate.is_infinite() && rate.is_sign_positive());
        assert!(!(rate <= 1e12));
    }

    #[test]
    fn test_projected_defaults_false() {
        assert!(!item(1.0, 1.0).projected());
    }
}
