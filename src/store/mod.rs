//! Persistence boundary for allocation records
//!
//! Repositories are external collaborators (the surrounding application owns
//! the actual storage); this module defines their contracts and the
//! [`AllocationStore`] that sits between workflows and the repositories.
//! The store owns the allocation invariant: an expense has at most one
//! active correlation at any time, enforced as a uniqueness constraint on
//! `expense_id` at the storage layer. Workflows never write around it.

pub mod memory;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::AllocationResult;
use crate::models::{
    CommitOutcome, Correlation, CorrelationRequest, EstimateId, Expense, ExpenseId, LineItem,
    ProjectId,
};

/// Per-record result of a storage-layer batch insert
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    /// The record was persisted
    Inserted(Correlation),
    /// An active correlation already exists for this expense
    DuplicateExpense { expense_id: ExpenseId },
    /// Transient storage failure for this record only
    Failed {
        expense_id: ExpenseId,
        reason: String,
    },
}

/// Contract for the expense side of the data store
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// All expenses recorded against a project
    async fn list_expenses(&self, project_id: ProjectId) -> AllocationResult<Vec<Expense>>;

    /// Flip the planned flag on the given expenses
    async fn mark_planned(&self, expense_ids: &[ExpenseId]) -> AllocationResult<()>;
}

/// Contract for the estimate side of the data store
#[async_trait]
pub trait LineItemRepository: Send + Sync {
    /// All line items of the project's current approved estimate
    async fn list_line_items(&self, estimate_id: EstimateId) -> AllocationResult<Vec<LineItem>>;
}

/// Contract for correlation persistence.
///
/// Implementations must enforce the unique-`expense_id` invariant (e.g. a
/// unique constraint on the `expense_id` column) and report violations as
/// [`InsertOutcome::DuplicateExpense`], never by overwriting the first
/// writer.
#[async_trait]
pub trait CorrelationRepository: Send + Sync {
    /// Which of the given expenses currently have an active correlation
    async fn list_active_expense_ids(
        &self,
        expense_ids: &[ExpenseId],
    ) -> AllocationResult<HashSet<ExpenseId>>;

    /// Insert a batch of correlation records, one outcome per input record
    /// in input order. One record's duplicate or failure must not block its
    /// siblings.
    async fn insert_batch(
        &self,
        records: Vec<CorrelationRequest>,
    ) -> AllocationResult<Vec<InsertOutcome>>;
}

/// The single write path for allocations.
///
/// Batch commits are per-record atomic, not all-or-nothing: every input
/// record gets exactly one [`CommitOutcome`], and a conflict or transient
/// failure on one record never blocks the rest of the batch.
pub struct AllocationStore {
    expenses: Arc<dyn ExpenseRepository>,
    correlations: Arc<dyn CorrelationRepository>,
}

impl AllocationStore {
    /// Create a store over the two repositories it mediates
    pub fn new(
        expenses: Arc<dyn ExpenseRepository>,
        correlations: Arc<dyn CorrelationRepository>,
    ) -> Self {
        Self {
            expenses,
            correlations,
        }
    }

    /// Ids of the project's expenses that have no active correlation
    pub async fn list_unallocated(
        &self,
        project_id: ProjectId,
    ) -> AllocationResult<Vec<ExpenseId>> {
        let expenses = self.expenses.list_expenses(project_id).await?;
        let ids: Vec<ExpenseId> = expenses.iter().map(|e| e.id).collect();
        let active = self.correlations.list_active_expense_ids(&ids).await?;
        Ok(ids.into_iter().filter(|id| !active.contains(id)).collect())
    }

    /// Which of the given expenses currently have an active correlation.
    ///
    /// Workflows call this immediately before committing to narrow (not
    /// eliminate) the race window; the storage constraint remains the final
    /// arbiter.
    pub async fn active_expense_ids(
        &self,
        expense_ids: &[ExpenseId],
    ) -> AllocationResult<HashSet<ExpenseId>> {
        self.correlations.list_active_expense_ids(expense_ids).await
    }

    /// Commit a batch of correlation records.
    ///
    /// Returns one outcome per input record in input order. Committed
    /// expenses are marked planned as part of the same logical operation. A
    /// whole-call repository failure is mapped to `Failed` for every record
    /// so the full-accounting contract always holds.
    pub async fn commit_batch(
        &self,
        records: Vec<CorrelationRequest>,
    ) -> AllocationResult<Vec<CommitOutcome>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let expense_ids: Vec<ExpenseId> = records.iter().map(|r| r.expense_id).collect();
        debug!(batch_size = records.len(), "committing correlation batch");

        let insert_outcomes = match self.correlations.insert_batch(records).await {
            Ok(outcomes) => outcomes,
            Err(err) => {
                warn!(error = %err, "correlation batch insert failed wholesale");
                let reason = err.to_string();
                return Ok(expense_ids
                    .into_iter()
                    .map(|expense_id| CommitOutcome::Failed {
                        expense_id,
                        reason: reason.clone(),
                    })
                    .collect());
            }
        };

        let outcomes: Vec<CommitOutcome> = insert_outcomes
            .into_iter()
            .map(|outcome| match outcome {
                InsertOutcome::Inserted(correlation) => CommitOutcome::Committed(correlation),
                InsertOutcome::DuplicateExpense { expense_id } => {
                    debug!(%expense_id, "expense already allocated, first writer wins");
                    CommitOutcome::Conflict { expense_id }
                }
                InsertOutcome::Failed { expense_id, reason } => {
                    CommitOutcome::Failed { expense_id, reason }
                }
            })
            .collect();

        let committed: Vec<ExpenseId> = outcomes
            .iter()
            .filter(|o| o.is_committed())
            .map(|o| o.expense_id())
            .collect();

        if !committed.is_empty() {
            // The planned flag is derived display state; a failure here does
            // not undo the committed correlations.
            if let Err(err) = self.expenses.mark_planned(&committed).await {
                warn!(error = %err, count = committed.len(), "failed to mark expenses planned");
            }
        }

        Ok(outcomes)
    }
}
