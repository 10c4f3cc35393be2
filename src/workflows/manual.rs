//! Manual bulk allocation
//!
//! A user picks a set of expenses and one target line item; every selected
//! expense that is still unallocated gets a correlation to that line item.
//! Manual assignments carry no confidence score.

use std::sync::Arc;

use tracing::info;

use crate::error::{AllocationError, AllocationResult};
use crate::models::{CommitOutcome, CorrelationRequest, EstimateId, ExpenseId, LineItemId};
use crate::store::{AllocationStore, LineItemRepository};

/// Orchestrates user-selected bulk assignment of expenses to one line item
pub struct ManualAllocationWorkflow {
    store: Arc<AllocationStore>,
    line_items: Arc<dyn LineItemRepository>,
}

impl ManualAllocationWorkflow {
    /// Create a workflow over the store and the estimate's line items
    pub fn new(store: Arc<AllocationStore>, line_items: Arc<dyn LineItemRepository>) -> Self {
        Self { store, line_items }
    }

    /// Bulk-assign the selected expenses to the target line item.
    ///
    /// Validates before any mutation: the selection must be non-empty and
    /// the target line item must exist in the estimate. The active set is
    /// re-checked immediately before commit; selections that gained a
    /// correlation in the meantime are reported as `Conflict`. Returns one
    /// outcome per selected expense, in selection order.
    pub async fn assign(
        &self,
        estimate_id: EstimateId,
        expense_ids: &[ExpenseId],
        line_item_id: LineItemId,
    ) -> AllocationResult<Vec<CommitOutcome>> {
        if expense_ids.is_empty() {
            return Err(AllocationError::Validation(
                "No expenses selected for allocation".into(),
            ));
        }

        let line_items = self.line_items.list_line_items(estimate_id).await?;
        if !line_items.iter().any(|li| li.id == line_item_id) {
            return Err(AllocationError::line_item_not_found(
                line_item_id.to_string(),
            ));
        }

        // Narrow the race window against concurrent auto-allocation or
        // another manual assignment; the storage constraint catches the
        // rest.
        let now_allocated = self.store.active_expense_ids(expense_ids).await?;

        let requests: Vec<CorrelationRequest> = expense_ids
            .iter()
            .filter(|id| !now_allocated.contains(id))
            .map(|&expense_id| CorrelationRequest::manual(expense_id, line_item_id))
            .collect();

        let committed = self.store.commit_batch(requests).await?;
        let mut committed = committed.into_iter();

        let outcomes: Vec<CommitOutcome> = expense_ids
            .iter()
            .map(|&expense_id| {
                if now_allocated.contains(&expense_id) {
                    CommitOutcome::Conflict { expense_id }
                } else {
                    committed.next().unwrap_or(CommitOutcome::Failed {
                        expense_id,
                        reason: "missing outcome from batch commit".to_string(),
                    })
                }
            })
            .collect();

        info!(
            %line_item_id,
            committed = outcomes.iter().filter(|o| o.is_committed()).count(),
            conflicts = outcomes.iter().filter(|o| o.is_conflict()).count(),
            total = outcomes.len(),
            "manual allocation batch finished"
        );
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Expense, ExpenseCategory, LineItem, LineItemCategory, Money, ProjectId,
    };
    use crate::store::memory::{InMemoryCorrelations, InMemoryExpenses, InMemoryLineItems};
    use chrono::NaiveDate;

    fn expense(project_id: ProjectId) -> Expense {
        Expense::new(
            project_id,
            Money::from_cents(25_000),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            ExpenseCategory::Equipment,
        )
    }

    fn setup(
        expenses: Vec<Expense>,
        line_items: Vec<LineItem>,
    ) -> (Arc<AllocationStore>, ManualAllocationWorkflow) {
        let expense_repo = Arc::new(InMemoryExpenses::new(expenses));
        let line_item_repo = Arc::new(InMemoryLineItems::new(line_items));
        let correlations = Arc::new(InMemoryCorrelations::new());
        let store = Arc::new(AllocationStore::new(expense_repo, correlations));
        let workflow = ManualAllocationWorkflow::new(store.clone(), line_item_repo);
        (store, workflow)
    }

    fn scaffold_item(estimate_id: EstimateId) -> LineItem {
        LineItem::new(
            estimate_id,
            LineItemCategory::Equipment,
            "scaffold rental",
            1.0,
            Money::from_cents(120_000),
            Money::from_cents(100_000),
        )
    }

    #[tokio::test]
    async fn test_bulk_assign_commits_every_selection() {
        let project_id = ProjectId::new();
        let estimate_id = EstimateId::new();
        let expenses: Vec<Expense> = (0..3).map(|_| expense(project_id)).collect();
        let ids: Vec<ExpenseId> = expenses.iter().map(|e| e.id).collect();
        let item = scaffold_item(estimate_id);
        let item_id = item.id;
        let (_, workflow) = setup(expenses, vec![item]);

        let outcomes = workflow.assign(estimate_id, &ids, item_id).await.unwrap();

        assert_eq!(outcomes.len(), 3);
        for outcome in &outcomes {
            match outcome {
                CommitOutcome::Committed(correlation) => {
                    assert!(!correlation.auto_correlated);
                    assert_eq!(correlation.confidence_score, None);
                    assert_eq!(correlation.line_item_id, item_id);
                }
                other => panic!("expected committed, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_empty_selection_is_rejected_before_io() {
        let estimate_id = EstimateId::new();
        let item = scaffold_item(estimate_id);
        let item_id = item.id;
        let (_, workflow) = setup(vec![], vec![item]);

        let err = workflow.assign(estimate_id, &[], item_id).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_unknown_line_item_is_rejected() {
        let project_id = ProjectId::new();
        let estimate_id = EstimateId::new();
        let e = expense(project_id);
        let e_id = e.id;
        let (_, workflow) = setup(vec![e], vec![scaffold_item(estimate_id)]);

        let err = workflow
            .assign(estimate_id, &[e_id], LineItemId::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_scenario_c_concurrent_allocations_surface_as_conflicts() {
        let project_id = ProjectId::new();
        let estimate_id = EstimateId::new();
        let expenses: Vec<Expense> = (0..5).map(|_| expense(project_id)).collect();
        let ids: Vec<ExpenseId> = expenses.iter().map(|e| e.id).collect();
        let item = scaffold_item(estimate_id);
        let item_id = item.id;
        let (store, workflow) = setup(expenses, vec![item]);

        // Two of the five get allocated elsewhere before the bulk commit.
        store
            .commit_batch(vec![
                CorrelationRequest::manual(ids[1], item_id),
                CorrelationRequest::manual(ids[3], item_id),
            ])
            .await
            .unwrap();

        let outcomes = workflow.assign(estimate_id, &ids, item_id).await.unwrap();

        assert_eq!(outcomes.len(), 5);
        assert_eq!(outcomes.iter().filter(|o| o.is_committed()).count(), 3);
        assert_eq!(outcomes.iter().filter(|o| o.is_conflict()).count(), 2);
        assert!(outcomes[1].is_conflict());
        assert!(outcomes[3].is_conflict());
    }

    #[tokio::test]
    async fn test_outcomes_follow_selection_order() {
        let project_id = ProjectId::new();
        let estimate_id = EstimateId::new();
        let expenses: Vec<Expense> = (0..4).map(|_| expense(project_id)).collect();
        let ids: Vec<ExpenseId> = expenses.iter().map(|e| e.id).collect();
        let item = scaffold_item(estimate_id);
        let item_id = item.id;
        let (_, workflow) = setup(expenses, vec![item]);

        let outcomes = workflow.assign(estimate_id, &ids, item_id).await.unwrap();
        let outcome_ids: Vec<ExpenseId> = outcomes.iter().map(|o| o.expense_id()).collect();
        assert_eq!(outcome_ids, ids);
    }
}
