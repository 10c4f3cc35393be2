//! Confidence scoring for (expense, line item) pairs
//!
//! The score is a 0–100 integer built from weighted sub-scores. Category
//! compatibility is a pre-filter, not a weighted term: `score` is defined
//! only for pairs the [`CategoryCompatibilityMap`] allows, and the flat
//! 40-point category contribution reflects that the pre-filter has already
//! passed. Scoring is pure: a fixed input snapshot always produces the same
//! score.

use std::collections::HashSet;

use crate::models::{Expense, LineItem};

use super::compatibility::CategoryCompatibilityMap;

/// Flat contribution once the category pre-filter passes
const CATEGORY_WEIGHT: u8 = 40;
/// Maximum contribution of amount proximity
const AMOUNT_WEIGHT: u8 = 20;
/// Contribution of a description keyword overlap
const KEYWORD_WEIGHT: u8 = 10;
/// Reserved headroom for payee-based fuzzy matching. Kept on the 100-point
/// scale so thresholds retain their meaning once the dimension lands;
/// currently always contributes 0.
#[allow(dead_code)]
const PAYEE_WEIGHT: u8 = 30;

/// Tokens dropped before keyword comparison, alongside any token of
/// length <= 3
const STOP_WORDS: [&str; 5] = ["the", "and", "for", "with", "from"];

/// Computes confidence scores for category-compatible
/// (expense, line item) pairs
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    compatibility: CategoryCompatibilityMap,
}

impl ScoringEngine {
    /// Create a scorer over an immutable compatibility table
    pub fn new(compatibility: CategoryCompatibilityMap) -> Self {
        Self { compatibility }
    }

    /// The compatibility table this scorer was built with
    pub fn compatibility(&self) -> &CategoryCompatibilityMap {
        &self.compatibility
    }

    /// Score one compatible (expense, line item) pair, in `[0, 100]`.
    ///
    /// Callers must pre-filter on category compatibility; this method
    /// assumes the pair passed and awards the flat category contribution.
    pub fn score(&self, expense: &Expense, line_item: &LineItem) -> u8 {
        let total = u16::from(CATEGORY_WEIGHT)
            + u16::from(amount_proximity_score(expense, line_item))
            + u16::from(keyword_overlap_score(expense, line_item));
        // Payee affinity: reserved, always 0 for now.
        total.min(100) as u8
    }
}

/// Amount proximity sub-score: 20 within 5%, 15 within 10%, 10 within 20%,
/// otherwise 0. A zero-cost line item contributes 0 (undefined ratio).
fn amount_proximity_score(expense: &Expense, line_item: &LineItem) -> u8 {
    let total_cost = line_item.total_cost();
    if total_cost.is_zero() {
        return 0;
    }

    let diff = (expense.amount - total_cost).abs().cents() as f64;
    let percent_diff = diff / total_cost.abs().cents() as f64 * 100.0;

    if percent_diff <= 5.0 {
        AMOUNT_WEIGHT
    } else if percent_diff <= 10.0 {
        15
    } else if percent_diff <= 20.0 {
        10
    } else {
        0
    }
}

/// Keyword overlap sub-score: 10 if the descriptions share at least one
/// significant token, otherwise 0. No partial credit.
fn keyword_overlap_score(expense: &Expense, line_item: &LineItem) -> u8 {
    let expense_desc = match &expense.description {
        Some(desc) => desc,
        None => return 0,
    };

    let expense_tokens = significant_tokens(expense_desc);
    if expense_tokens.is_empty() {
        return 0;
    }
    let line_item_tokens = significant_tokens(&line_item.description);

    if expense_tokens.intersection(&line_item_tokens).next().is_some() {
        KEYWORD_WEIGHT
    } else {
        0
    }
}

/// Lower-cased whitespace tokens with short tokens and stop words removed
fn significant_tokens(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|token| token.to_lowercase())
        .filter(|token| token.len() > 3 && !STOP_WORDS.contains(&token.as_str()))
        .collect()
}
