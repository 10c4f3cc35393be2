//! In-memory repository implementations
//!
//! Reference adapters for the repository contracts, used by the crate's own
//! tests and as the template for real storage adapters. Data lives in
//! `RwLock`-guarded maps; the correlation map is keyed by `expense_id`,
//! which is exactly the uniqueness constraint the storage layer must
//! enforce. Transient failures can be injected per expense, per batch, or
//! on the planned-flag update to exercise the error paths.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{AllocationError, AllocationResult};
use crate::models::{
    CorrelationRequest, EstimateId, Expense, ExpenseId, LineItem, ProjectId,
};

use super::{CorrelationRepository, ExpenseRepository, InsertOutcome, LineItemRepository};

fn lock_error(e: impl std::fmt::Display) -> AllocationError {
    AllocationError::Repository(format!("Failed to acquire lock: {}", e))
}

/// In-memory expense repository
pub struct InMemoryExpenses {
    data: RwLock<Vec<Expense>>,
    /// When set, the next `mark_planned` call fails
    fail_mark_planned: AtomicBool,
}

impl InMemoryExpenses {
    /// Create a repository seeded with the given expenses
    pub fn new(expenses: Vec<Expense>) -> Self {
        Self {
            data: RwLock::new(expenses),
            fail_mark_planned: AtomicBool::new(false),
        }
    }

    /// Make the next `mark_planned` call fail with a transient error
    pub fn fail_mark_planned(&self) {
        self.fail_mark_planned.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryExpenses {
    async fn list_expenses(&self, project_id: ProjectId) -> AllocationResult<Vec<Expense>> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data
            .iter()
            .filter(|e| e.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn mark_planned(&self, expense_ids: &[ExpenseId]) -> AllocationResult<()> {
        if self.fail_mark_planned.swap(false, Ordering::SeqCst) {
            return Err(AllocationError::Repository(
                "storage unavailable".to_string(),
            ));
        }

        let ids: HashSet<ExpenseId> = expense_ids.iter().copied().collect();
        let mut data = self.data.write().map_err(lock_error)?;
        for expense in data.iter_mut().filter(|e| ids.contains(&e.id)) {
            expense.planned = true;
            expense.updated_at = chrono::Utc::now();
        }
        Ok(())
    }
}

/// In-memory line item repository
pub struct InMemoryLineItems {
    data: RwLock<Vec<LineItem>>,
}

impl InMemoryLineItems {
    /// Create a repository seeded with the given line items
    pub fn new(line_items: Vec<LineItem>) -> Self {
        Self {
            data: RwLock::new(line_items),
        }
    }
}

#[async_trait]
impl LineItemRepository for InMemoryLineItems {
    async fn list_line_items(&self, estimate_id: EstimateId) -> AllocationResult<Vec<LineItem>> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data
            .iter()
            .filter(|li| li.estimate_id == estimate_id)
            .cloned()
            .collect())
    }
}

/// In-memory correlation repository enforcing the unique-expense invariant
pub struct InMemoryCorrelations {
    /// Keyed by expense id: the uniqueness constraint itself
    data: RwLock<HashMap<ExpenseId, crate::models::Correlation>>,
    /// Expense ids whose inserts should fail with a transient error
    failing: RwLock<HashSet<ExpenseId>>,
    /// When set, the next `insert_batch` call fails wholesale
    fail_next_batch: AtomicBool,
}

impl InMemoryCorrelations {
    /// Create an empty repository
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            failing: RwLock::new(HashSet::new()),
            fail_next_batch: AtomicBool::new(false),
        }
    }

    /// Inject a per-record transient failure for the given expense
    pub fn fail_inserts_for(&self, expense_id: ExpenseId) -> AllocationResult<()> {
        let mut failing = self.failing.write().map_err(lock_error)?;
        failing.insert(expense_id);
        Ok(())
    }

    /// Make the next `insert_batch` call fail as a whole
    pub fn fail_next_batch(&self) {
        self.fail_next_batch.store(true, Ordering::SeqCst);
    }

    /// Number of stored correlations
    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.len()).unwrap_or(0)
    }

    /// Whether the repository holds no correlations
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryCorrelations {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CorrelationRepository for InMemoryCorrelations {
    async fn list_active_expense_ids(
        &self,
        expense_ids: &[ExpenseId],
    ) -> AllocationResult<HashSet<ExpenseId>> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(expense_ids
            .iter()
            .copied()
            .filter(|id| data.contains_key(id))
            .collect())
    }

    async fn insert_batch(
        &self,
        records: Vec<CorrelationRequest>,
    ) -> AllocationResult<Vec<InsertOutcome>> {
        if self.fail_next_batch.swap(false, Ordering::SeqCst) {
            return Err(AllocationError::Repository(
                "storage unavailable".to_string(),
            ));
        }

        let failing = self.failing.read().map_err(lock_error)?.clone();
        let mut data = self.data.write().map_err(lock_error)?;

        let mut outcomes = Vec::with_capacity(records.len());
        for request in records {
            let expense_id = request.expense_id;

            if failing.contains(&expense_id) {
                outcomes.push(InsertOutcome::Failed {
                    expense_id,
                    reason: "simulated transient failure".to_string(),
                });
                continue;
            }

            if data.contains_key(&expense_id) {
                outcomes.push(InsertOutcome::DuplicateExpense { expense_id });
                continue;
            }

            let correlation = request.into_correlation();
            data.insert(expense_id, correlation.clone());
            outcomes.push(InsertOutcome::Inserted(correlation));
        }

        Ok(outcomes)
    }
}
