//! # engine::view
//!
//! Pure derivation of the table view from `(items, criteria, sort)`.
//! Recomputed on every request; the published item set is never touched.

use std::cmp::Ordering;

use crate::models::{FilterCriteria, Item, SortKey};

/// Filter then stably sort.
///
/// Zero-reference items are rejected before rate is consulted, so no NaN ever
/// reaches a comparison.
pub fn view(items: &[Item], criteria: &FilterCriteria, sort: SortKey) -> Vec<Item> {
    let needle = criteria.search_text.to_lowercase();

    let mut out: Vec<Item> = items
        .iter()
        .filter(|item| matches(item, criteria, &needle))
        .cloned()
        .collect();

    // `sort_by` is stable: equal keys keep their post-dedup order.
    match sort {
        SortKey::ReferenceValue => out.sort_by(|a, b| a.reference_value.total_cmp(&b.reference_value)),
        SortKey::DerivedRate | SortKey::None => out.sort_by(by_rate),
    }

    out
}

fn matches(item: &Item, criteria: &FilterCriteria, needle: &str) -> bool {
    item.reference_value > 0.0
        && item.reference_value >= criteria.min_value
        && item.reference_value <= criteria.max_value
        && item.ask_price > 0.0
        && item.rate() <= criteria.max_rate
        && (needle.is_empty() || item.name.to_lowercase().contains(needle))
}

fn by_rate(a: &Item, b: &Item) -> Ordering {
    a.rate().total_cmp(&b.rate())
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str, reference_value: f64, ask_price: f64) -> Item {
        Item { id, name: name.into(), reference_value, ask_price, is_projected: None }
    }

    fn open_criteria() -> FilterCriteria {
        FilterCriteria {
            min_value: 0.0,
            max_value: f64::MAX,
            max_rate: f64::MAX,
            search_text: String::new(),
        }
    }

    fn ids(items: &[Item]) -> Vec<i64> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_rate_threshold_inclusive() {
        let items = vec![item(1, "Fedora", 1000.0, 4.0)];
        let criteria = FilterCriteria { max_rate: 4.5, ..open_criteria() };
        assert_eq!(ids(&view(&items, &criteria, SortKey::None)), vec![1]);

        let criteria = FilterCriteria { max_rate: 4.0, ..open_criteria() };
        assert_eq!(ids(&view(&items, &criteria, SortKey::None)), vec![1]);

        let criteria = FilterCriteria { max_rate: 3.99, ..open_criteria() };
        assert!(view(&items, &criteria, SortKey::None).is_empty());
    }

    #[test]
    fn test_value_range_inclusive() {
        let items = vec![
            item(1, "low", 999.0, 1.0),
            item(2, "min", 1000.0, 1.0),
            item(3, "max", 5000.0, 1.0),
            item(4, "high", 5001.0, 1.0),
        ];
        let criteria = FilterCriteria { min_value: 1000.0, max_value: 5000.0, ..open_criteria() };
        let mut got = ids(&view(&items, &criteria, SortKey::None));
        got.sort();
        assert_eq!(got, vec![2, 3]);
    }

    #[test]
    fn test_zero_reference_never_shown() {
        let items = vec![item(1, "ghost", 0.0, 5.0), item(2, "free ghost", 0.0, 0.0)];
        assert!(view(&items, &open_criteria(), SortKey::None).is_empty());
        assert!(view(&items, &open_criteria(), SortKey::ReferenceValue).is_empty());
        assert!(view(&items, &open_criteria(), SortKey::DerivedRate).is_empty());
    }

    #[test]
    fn test_zero_ask_excluded() {
        let items = vec![item(1, "gift", 1000.0, 0.0)];
        assert!(view(&items, &open_criteria(), SortKey::None).is_empty());
    }

    #[test]
    fn test_search_case_insensitive() {
        let items = vec![
            item(1, "Sparkle Time Fedora", 1000.0, 1.0),
            item(2, "Red Baseball Cap", 1000.0, 1.0),
        ];
        let criteria = FilterCriteria { search_text: "FEDORA".into(), ..open_criteria() };
        assert_eq!(ids(&view(&items, &criteria, SortKey::None)), vec![1]);

        let criteria = FilterCriteria { search_text: "".into(), ..open_criteria() };
        assert_eq!(view(&items, &criteria, SortKey::None).len(), 2);
    }

    #[test]
    fn test_filter_properties_hold_for_every_output() {
        let items: Vec<Item> = (0..50)
            .map(|i| item(i, if i % 3 == 0 { "Domino Crown" } else { "Hat" }, (i * 137 % 4000) as f64, (i % 11) as f64))
            .collect();
        let criteria = FilterCriteria {
            min_value: 500.0,
            max_value: 3500.0,
            max_rate: 3.0,
            search_text: "crown".into(),
        };

        for it in view(&items, &criteria, SortKey::DerivedRate) {
            assert!(it.reference_value >= 500.0 && it.reference_value <= 3500.0);
            assert!(it.rate() <= 3.0);
            assert!(it.ask_price > 0.0);
            assert!(it.name.to_lowercase().contains("crown"));
        }
    }

    #[test]
    fn test_sort_by_reference_value() {
        let items = vec![item(1, "a", 3000.0, 1.0), item(2, "b", 1000.0, 1.0), item(3, "c", 2000.0, 1.0)];
        assert_eq!(ids(&view(&items, &open_criteria(), SortKey::ReferenceValue)), vec![2, 3, 1]);
    }

    #[test]
    fn test_none_sorts_by_rate_like_derived_rate() {
        let items = vec![
            item(1, "a", 1000.0, 3.0),  // 3.0
            item(2, "b", 1000.0, 1.0),  // 1.0
            item(3, "c", 2000.0, 4.0),  // 2.0
        ];
        assert_eq!(ids(&view(&items, &open_criteria(), SortKey::DerivedRate)), vec![2, 3, 1]);
        assert_eq!(ids(&view(&items, &open_criteria(), SortKey::None)), vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let items = vec![
            item(10, "x", 1000.0, 2.0),
            item(11, "y", 2000.0, 4.0), // same rate as 10
            item(12, "z", 500.0, 0.5),
            item(13, "w", 1000.0, 2.0), // same rate + value as 10
        ];
        assert_eq!(ids(&view(&items, &open_criteria(), SortKey::DerivedRate)), vec![12, 10, 11, 13]);
        assert_eq!(ids(&view(&items, &open_criteria(), SortKey::ReferenceValue)), vec![12, 10, 13, 11]);
    }

    #[test]
    fn test_view_does_not_mutate_input() {
        let items = vec![item(1, "a", 3000.0, 1.0), item(2, "b", 1000.0, 1.0)];
        let before = items.clone();
        let _ = view(&items, &open_criteria(), SortKey::ReferenceValue);
        assert_eq!(items, before);
    }
}
