//! # models::criteria
//!
//! User-controlled view inputs: [`FilterCriteria`] and [`SortKey`].
//! Both are ephemeral; they are never stored alongside the item set.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_VALUE: f64 = 0.0;
pub const DEFAULT_MAX_VALUE: f64 = 1_000_000.0;
pub const DEFAULT_MAX_RATE: f64 = 4.5;

// ─── FilterCriteria ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Inclusive lower bound on `reference_value`.
    pub min_value: f64,
    /// Inclusive upper bound on `reference_value`.
    pub max_value: f64,
    /// Inclusive upper bound on the derived rate.
    pub max_rate: f64,
    /// Case-insensitive substring of the name. Empty matches everything.
    pub search_text: String,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            min_value: DEFAULT_MIN_VALUE,
            max_value: DEFAULT_MAX_VALUE,
            max_rate: DEFAULT_MAX_RATE,
            search_text: String::new(),
        }
    }
}

// ─── SortKey ──────────────────────────────────────────────────────────────────

/// View ordering. `None` still orders by rate (the dashboard's fallback).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    None,
    #[serde(alias = "rap", alias = "value")]
    ReferenceValue,
    #[serde(alias = "rate")]
    DerivedRate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_aliases() {
        let parse = |s: &str| serde_json::from_str::<SortKey>(&format!("\"{s}\"")).unwrap();
        assert_eq!(parse("rap"), SortKey::ReferenceValue);
        assert_eq!(parse("value"), SortKey::ReferenceValue);
        assert_eq!(parse("reference_value"), SortKey::ReferenceValue);
        assert_eq!(parse("rate"), SortKey::DerivedRate);
        assert_eq!(parse("none"), SortKey::None);
    }

    #[test]
    fn test_criteria_partial_json_uses_defaults() {
        let criteria: FilterCriteria = serde_json::from_str(r#"{"max_rate": 3.0}"#).unwrap();
        assert_eq!(criteria.max_rate, 3.0);
        assert_eq!(criteria.max_value, DEFAULT_MAX_VALUE);
        assert!(criteria.search_text.is_empty());
    }
}
