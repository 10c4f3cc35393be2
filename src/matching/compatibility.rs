//! Category compatibility rules
//!
//! A static, immutable mapping from expense category to the set of
//! line-item categories it may be allocated against. The mapping is a plain
//! value injected at construction time, so the scorer stays pure and
//! deployments can supply their own table from configuration.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{ExpenseCategory, LineItemCategory};

/// Immutable expense-category → line-item-category compatibility table.
///
/// Categories with no configured mapping yield the empty set; that is a
/// normal outcome (zero candidates for the expense), not an error. The
/// mapping is a set per expense category so one-to-many relationships can be
/// configured even though the default table is effectively one-to-one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryCompatibilityMap {
    map: BTreeMap<ExpenseCategory, BTreeSet<LineItemCategory>>,
}

impl CategoryCompatibilityMap {
    /// Build a map from explicit pairs
    pub fn from_pairs<I, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (ExpenseCategory, C)>,
        C: IntoIterator<Item = LineItemCategory>,
    {
        let map = pairs
            .into_iter()
            .map(|(expense, compatible)| (expense, compatible.into_iter().collect()))
            .collect();
        Self { map }
    }

    /// Line-item categories compatible with the given expense category.
    ///
    /// Returns the empty set for unmapped categories.
    pub fn compatible_categories(&self, category: ExpenseCategory) -> &BTreeSet<LineItemCategory> {
        static EMPTY: BTreeSet<LineItemCategory> = BTreeSet::new();
        self.map.get(&category).unwrap_or(&EMPTY)
    }

    /// Check a single (expense category, line-item category) pair
    pub fn is_compatible(&self, expense: ExpenseCategory, line_item: LineItemCategory) -> bool {
        self.compatible_categories(expense).contains(&line_item)
    }
}

impl Default for CategoryCompatibilityMap {
    /// The standard construction mapping: each expense category matches its
    /// line-item counterpart. `Other` is intentionally unmapped.
    fn default() -> Self {
        Self::from_pairs([
            (ExpenseCategory::Materials, [LineItemCategory::Materials]),
            (ExpenseCategory::Labor, [LineItemCategory::Labor]),
            (ExpenseCategory::Equipment, [LineItemCategory::Equipment]),
            (
                ExpenseCategory::Subcontractor,
                [LineItemCategory::Subcontractor],
            ),
            (ExpenseCategory::Permits, [LineItemCategory::Permits]),
            (ExpenseCategory::Overhead, [LineItemCategory::Overhead]),
        ])
    }
}
