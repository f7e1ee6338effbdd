//! Group resolved items by category and order them for the report

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::resolver::ResolvedItem;

/// How category labels are compared when grouping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingPolicy {
    /// Treat "Drinks" and "drinks" as one group.
    ///
    /// The group is labelled with the smallest member spelling (plain `str`
    /// ordering) and every item in it is relabelled to match.
    pub case_fold: bool,
}

impl GroupingPolicy {
    pub fn exact() -> Self {
        Self { case_fold: false }
    }

    pub fn case_folded() -> Self {
        Self { case_fold: true }
    }

    fn key(&self, category: &str) -> String {
        if self.case_fold {
            category.to_lowercase()
        } else {
            category.to_string()
        }
    }
}

/// Items sharing one category, best sellers first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub category: String,
    pub items: Vec<ResolvedItem>,
}

impl CategoryGroup {
    pub fn total_sold(&self) -> u64 {
        self.items.iter().fold(0u64, |acc, i| acc.saturating_add(i.sold))
    }
}

/// Group, sort and order items
///
/// Groups are ordered by their displayed label using plain `str` ordering
/// (Unicode scalar order, locale-insensitive), with or without case folding.
/// Within a group items are sorted by `sold`
/// descending with a stable sort, so equal counts keep their input order.
pub fn aggregate(items: Vec<ResolvedItem>, policy: GroupingPolicy) -> Vec<CategoryGroup> {
    let mut buckets: BTreeMap<String, Vec<ResolvedItem>> = BTreeMap::new();
    for item in items {
        buckets.entry(policy.key(&item.category)).or_default().push(item);
    }

    let mut groups: Vec<CategoryGroup> = buckets
        .into_values()
        .filter(|items| !items.is_empty())
        .map(|mut items| {
            let category = items
                .iter()
                .map(|i| i.category.as_str())
                .min()
                .unwrap_or_default()
                .to_string();
            if policy.case_fold {
                for item in &mut items {
                    if item.category != category {
                        item.category = category.clone();
                    }
                }
            }
            items.sort_by(|a, b| b.sold.cmp(&a.sold));
            CategoryGroup { category, items }
        })
        .collect();

    // Folded keys can order differently from the labels they display
    groups.sort_by(|a, b| a.category.cmp(&b.category));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flatten(groups: &[CategoryGroup]) -> Vec<ResolvedItem> {
        groups.iter().flat_map(|g| g.items.iter().cloned()).collect()
    }

    fn item(name: &str, category: &str, sold: u64) -> ResolvedItem {
        ResolvedItem::new(name, category, sold)
    }

    #[test]
    fn test_groups_sorted_by_label_not_insertion() {
        let groups = aggregate(
            vec![
                item("Chips", "Snacks", 3),
                item("Latte", "Drinks", 5),
                item("Mug", "Merch", 1),
            ],
            GroupingPolicy::exact(),
        );

        let labels: Vec<&str> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(labels, vec!["Drinks", "Merch", "Snacks"]);
    }

    #[test]
    fn test_items_descending_and_stable() {
        let groups = aggregate(
            vec![
                item("A", "Drinks", 5),
                item("B", "Drinks", 10),
                item("C", "Drinks", 5),
                item("D", "Drinks", 7),
                item("E", "Drinks", 5),
            ],
            GroupingPolicy::exact(),
        );

        let names: Vec<&str> = groups[0].items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["B", "D", "A", "C", "E"]);
    }

    #[test]
    fn test_exact_policy_keeps_case_variants_apart() {
        let groups = aggregate(
            vec![item("A", "drinks", 1), item("B", "Drinks", 2)],
            GroupingPolicy::exact(),
        );
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "Drinks");
        assert_eq!(groups[1].category, "drinks");
    }

    #[test]
    fn test_case_fold_merges_and_relabels() {
        let groups = aggregate(
            vec![item("A", "drinks", 1), item("B", "DRINKS", 9), item("C", "Drinks", 4)],
            GroupingPolicy::case_folded(),
        );

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].category, "DRINKS");
        assert!(groups[0].items.iter().all(|i| i.category == "DRINKS"));
        assert_eq!(groups[0].total_sold(), 14);
    }

    #[test]
    fn test_case_fold_orders_by_displayed_label() {
        let groups = aggregate(
            vec![item("A", "apple", 1), item("B", "DRINKS", 2), item("C", "drinks", 3)],
            GroupingPolicy::case_folded(),
        );
        let labels: Vec<&str> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(labels, vec!["DRINKS", "apple"]);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        for policy in [GroupingPolicy::exact(), GroupingPolicy::case_folded()] {
            let first = aggregate(
                vec![
                    item("A", "snacks", 2),
                    item("B", "Drinks", 3),
                    item("C", "Snacks", 2),
                    item("D", "drinks", 8),
                    item("E", "Snacks", 2),
                ],
                policy,
            );
            let second = aggregate(flatten(&first), policy);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_empty_input_has_no_groups() {
        assert!(aggregate(Vec::new(), GroupingPolicy::exact()).is_empty());
    }
}
