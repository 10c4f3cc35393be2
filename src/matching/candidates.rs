//! Candidate selection
//!
//! For each unallocated expense, score every category-compatible line item
//! and keep the single best one as the suggestion. The suggestion and the
//! confidence are always computed from the same best-scoring line item, so
//! what a reviewer sees suggested is what the confidence refers to.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{Expense, ExpenseId, LineItem, LineItemId};

use super::scoring::ScoringEngine;

/// An expense paired with its best-scoring suggested line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// The unallocated expense
    pub expense_id: ExpenseId,

    /// The best-scoring compatible line item, or `None` when the expense's
    /// category has no compatible line items
    pub suggested_line_item_id: Option<LineItemId>,

    /// Confidence that the expense belongs to the suggested line item,
    /// 0 when there is no suggestion
    pub confidence: u8,
}

/// Selects the best-match line item for each unallocated expense.
///
/// Pure over immutable snapshots: no I/O, safe to call repeatedly and
/// concurrently.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    scorer: ScoringEngine,
}

impl CandidateGenerator {
    /// Create a generator around a scoring engine
    pub fn new(scorer: ScoringEngine) -> Self {
        Self { scorer }
    }

    /// Produce one candidate per expense not in `already_allocated`.
    ///
    /// Ties are broken by stable input order: the first compatible line item
    /// with the maximum score wins. Expenses whose category has an empty
    /// compatibility set yield a candidate with no suggestion and
    /// confidence 0; that is a normal outcome, not an error.
    pub fn generate(
        &self,
        expenses: &[Expense],
        line_items: &[LineItem],
        already_allocated: &HashSet<ExpenseId>,
    ) -> Vec<Candidate> {
        expenses
            .iter()
            .filter(|expense| !already_allocated.contains(&expense.id))
            .map(|expense| self.best_match(expense, line_items))
            .collect()
    }

    /// Find the best-scoring compatible line item for one expense
    fn best_match(&self, expense: &Expense, line_items: &[LineItem]) -> Candidate {
        let compatible = self
            .scorer
            .compatibility()
            .compatible_categories(expense.category);

        let mut best: Option<(LineItemId, u8)> = None;
        for line_item in line_items {
            if !compatible.contains(&line_item.category) {
                continue;
            }
            let score = self.scorer.score(expense, line_item);
            // Strict comparison keeps the first max-scoring item on ties.
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((line_item.id, score));
            }
        }

        match best {
            Some((line_item_id, score)) => Candidate {
                expense_id: expense.id,
                suggested_line_item_id: Some(line_item_id),
                confidence: score,
            },
            None => Candidate {
                expense_id: expense.id,
                suggested_line_item_id: None,
                confidence: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::CategoryCompatibilityMap;
    use crate::models::{
        EstimateId, ExpenseCategory, LineItemCategory, Money, ProjectId,
    };
    use chrono::NaiveDate;

    fn expense(category: ExpenseCategory, cents: i64) -> Expense {
        Expense::new(
            ProjectId::new(),
            Money::from_cents(cents),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            category,
        )
    }

    fn line_item(category: LineItemCategory, description: &str, cost_cents: i64) -> LineItem {
        LineItem::new(
            EstimateId::new(),
            category,
            description,
            1.0,
            Money::from_cents(cost_cents),
            Money::from_cents(cost_cents),
        )
    }

    fn generator() -> CandidateGenerator {
        CandidateGenerator::new(ScoringEngine::new(CategoryCompatibilityMap::default()))
    }

    #[test]
    fn test_picks_best_scoring_item_for_both_suggestion_and_confidence() {
        let e = expense(ExpenseCategory::Materials, 100_000);
        let far = line_item(LineItemCategory::Materials, "siding", 300_000);
        let close = line_item(LineItemCategory::Materials, "framing", 101_000);
        let close_id = close.id;

        let candidates = generator().generate(&[e], &[far, close], &HashSet::new());
        assert_eq!(candidates.len(), 1);
        // The close item scores 60 (40 + 20); the far one only 40. The
        // suggestion and the confidence must come from the same item.
        assert_eq!(candidates[0].suggested_line_item_id, Some(close_id));
        assert_eq!(candidates[0].confidence, 60);
    }

    #[test]
    fn test_unmapped_category_yields_no_suggestion() {
        let e = expense(ExpenseCategory::Other, 100_000);
        let li = line_item(LineItemCategory::Materials, "framing", 100_000);

        let candidates = generator().generate(&[e], &[li], &HashSet::new());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].suggested_line_item_id, None);
        assert_eq!(candidates[0].confidence, 0);
    }

    #[test]
    fn test_incompatible_categories_yield_no_suggestion() {
        let e = expense(ExpenseCategory::Labor, 100_000);
        let li = line_item(LineItemCategory::Materials, "framing", 100_000);

        let candidates = generator().generate(&[e], &[li], &HashSet::new());
        assert_eq!(candidates[0].suggested_line_item_id, None);
        assert_eq!(candidates[0].confidence, 0);
    }

    #[test]
    fn test_already_allocated_expenses_are_skipped() {
        let allocated = expense(ExpenseCategory::Materials, 100_000);
        let open = expense(ExpenseCategory::Materials, 200_000);
        let open_id = open.id;
        let li = line_item(LineItemCategory::Materials, "framing", 100_000);

        let already: HashSet<_> = [allocated.id].into_iter().collect();
        let candidates = generator().generate(&[allocated, open], &[li], &already);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].expense_id, open_id);
    }

    #[test]
    fn test_tie_broken_by_input_order() {
        let e = expense(ExpenseCategory::Materials, 100_000);
        // Both items score identically (same category, same cost, no
        // description overlap); the first one in input order must win.
        let first = line_item(LineItemCategory::Materials, "slab", 100_000);
        let second = line_item(LineItemCategory::Materials, "deck", 100_000);
        let first_id = first.id;

        let candidates = generator().generate(&[e], &[first, second], &HashSet::new());
        assert_eq!(candidates[0].suggested_line_item_id, Some(first_id));
    }

    #[test]
    fn test_repeated_generation_is_stable() {
        let expenses = vec![
            expense(ExpenseCategory::Materials, 100_000),
            expense(ExpenseCategory::Labor, 50_000),
        ];
        let line_items = vec![
            line_item(LineItemCategory::Materials, "framing", 101_000),
            line_item(LineItemCategory::Labor, "framing crew", 50_000),
        ];

        let gen = generator();
        let first = gen.generate(&expenses, &line_items, &HashSet::new());
        let second = gen.generate(&expenses, &line_items, &HashSet::new());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.expense_id, b.expense_id);
            assert_eq!(a.suggested_line_item_id, b.suggested_line_item_id);
            assert_eq!(a.confidence, b.confidence);
        }
    }
}
