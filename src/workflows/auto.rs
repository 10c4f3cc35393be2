//! Auto-allocation workflow
//!
//! Computes high-confidence candidates, exposes them for human review, and
//! commits the confirmed batch. The dialog lifecycle is an explicit state
//! machine rather than a set of booleans, so confirming from `Idle` or
//! cancelling mid-commit is a typed error instead of a silent misstep:
//!
//! ```text
//! Idle -> ComputingCandidates -> PreviewReady -> Committing -> Done
//!                             \-> NoHighConfidenceMatches
//! PreviewReady -> Idle (cancel)
//! ```

use std::collections::HashSet;
use std::mem;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::AllocationSettings;
use crate::error::{AllocationError, AllocationResult};
use crate::matching::{Candidate, CandidateGenerator, CategoryCompatibilityMap, ScoringEngine};
use crate::models::{CommitOutcome, CorrelationRequest, EstimateId, ExpenseId, ProjectId};
use crate::store::{AllocationStore, ExpenseRepository, LineItemRepository};

/// Lifecycle of one auto-allocation pass
#[derive(Debug)]
pub enum AutoAllocationState {
    /// Nothing computed yet
    Idle,
    /// Snapshotting and scoring in progress
    ComputingCandidates,
    /// High-confidence candidates awaiting human review
    PreviewReady(Vec<Candidate>),
    /// No candidate met the threshold; terminal, no preview is opened
    NoHighConfidenceMatches,
    /// A confirmed batch is in flight; runs to its full per-record result
    Committing,
    /// Terminal, with one outcome per previewed candidate
    Done(Vec<CommitOutcome>),
}

impl AutoAllocationState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::ComputingCandidates => "ComputingCandidates",
            Self::PreviewReady(_) => "PreviewReady",
            Self::NoHighConfidenceMatches => "NoHighConfidenceMatches",
            Self::Committing => "Committing",
            Self::Done(_) => "Done",
        }
    }
}

/// Orchestrates candidate generation, threshold filtering, preview
/// confirmation, and batched commit
pub struct AutoAllocationWorkflow {
    generator: CandidateGenerator,
    store: Arc<AllocationStore>,
    expenses: Arc<dyn ExpenseRepository>,
    line_items: Arc<dyn LineItemRepository>,
    settings: AllocationSettings,
    state: AutoAllocationState,
}

impl AutoAllocationWorkflow {
    /// Create a workflow over the given repositories and compatibility rules
    pub fn new(
        store: Arc<AllocationStore>,
        expenses: Arc<dyn ExpenseRepository>,
        line_items: Arc<dyn LineItemRepository>,
        compatibility: CategoryCompatibilityMap,
        settings: AllocationSettings,
    ) -> Self {
        Self {
            generator: CandidateGenerator::new(ScoringEngine::new(compatibility)),
            store,
            expenses,
            line_items,
            settings,
            state: AutoAllocationState::Idle,
        }
    }

    /// Current workflow state, for UI binding
    pub fn state(&self) -> &AutoAllocationState {
        &self.state
    }

    /// The previewed candidates, when the workflow is in `PreviewReady`
    pub fn preview(&self) -> Option<&[Candidate]> {
        match &self.state {
            AutoAllocationState::PreviewReady(candidates) => Some(candidates),
            _ => None,
        }
    }

    /// Snapshot the project's data, generate candidates, and keep those at
    /// or above the confidence threshold.
    ///
    /// Only valid from `Idle`. Ends in `PreviewReady` when at least one
    /// candidate qualifies, in `NoHighConfidenceMatches` otherwise. A
    /// snapshot failure returns the workflow to `Idle`.
    pub async fn compute_candidates(
        &mut self,
        project_id: ProjectId,
        estimate_id: EstimateId,
    ) -> AllocationResult<&AutoAllocationState> {
        if !matches!(self.state, AutoAllocationState::Idle) {
            return Err(AllocationError::InvalidTransition {
                from: self.state.name(),
                action: "compute candidates",
            });
        }
        self.state = AutoAllocationState::ComputingCandidates;

        let snapshot = self.snapshot(project_id, estimate_id).await;
        let (expenses, line_items, already_allocated) = match snapshot {
            Ok(parts) => parts,
            Err(err) => {
                self.state = AutoAllocationState::Idle;
                return Err(err);
            }
        };

        let candidates = self
            .generator
            .generate(&expenses, &line_items, &already_allocated);
        let threshold = self.settings.confidence_threshold;
        let qualified: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| c.confidence >= threshold && c.suggested_line_item_id.is_some())
            .collect();

        debug!(
            threshold,
            qualified = qualified.len(),
            "auto-allocation candidates computed"
        );

        self.state = if qualified.is_empty() {
            AutoAllocationState::NoHighConfidenceMatches
        } else {
            AutoAllocationState::PreviewReady(qualified)
        };
        Ok(&self.state)
    }

    /// Commit the previewed candidates after a fresh unallocated re-check.
    ///
    /// Only valid from `PreviewReady`. Candidates whose expense gained a
    /// correlation since the preview are reported as `Conflict` without
    /// touching the store; the rest are committed with
    /// `auto_correlated = true` and the recorded confidence. Returns one
    /// outcome per previewed candidate, in preview order, and ends in
    /// `Done`.
    pub async fn confirm(&mut self) -> AllocationResult<Vec<CommitOutcome>> {
        let candidates = match &self.state {
            AutoAllocationState::PreviewReady(candidates) => candidates,
            other => {
                return Err(AllocationError::InvalidTransition {
                    from: other.name(),
                    action: "confirm",
                })
            }
        };

        // Re-derive the allocated set as close to commit time as practical;
        // the storage uniqueness constraint stays the final safety net.
        let expense_ids: Vec<ExpenseId> = candidates.iter().map(|c| c.expense_id).collect();
        let now_allocated = self.store.active_expense_ids(&expense_ids).await?;

        let candidates = match mem::replace(&mut self.state, AutoAllocationState::Committing) {
            AutoAllocationState::PreviewReady(candidates) => candidates,
            _ => unreachable!("checked above"),
        };

        let requests: Vec<CorrelationRequest> = candidates
            .iter()
            .filter(|c| !now_allocated.contains(&c.expense_id))
            .filter_map(|c| {
                c.suggested_line_item_id
                    .map(|line_item_id| CorrelationRequest::auto(c.expense_id, line_item_id, c.confidence))
            })
            .collect();

        let committed = match self.store.commit_batch(requests).await {
            Ok(outcomes) => outcomes,
            Err(err) => {
                self.state = AutoAllocationState::Idle;
                return Err(err);
            }
        };

        let outcomes = merge_outcomes(&candidates, &now_allocated, committed);
        info!(
            committed = outcomes.iter().filter(|o| o.is_committed()).count(),
            conflicts = outcomes.iter().filter(|o| o.is_conflict()).count(),
            total = outcomes.len(),
            "auto-allocation batch finished"
        );

        self.state = AutoAllocationState::Done(outcomes.clone());
        Ok(outcomes)
    }

    /// Discard the preview and return to `Idle`; nothing is persisted.
    ///
    /// Only valid from `PreviewReady`. A batch already in `Committing`
    /// cannot be cancelled; it runs to its full per-record result.
    pub fn cancel(&mut self) -> AllocationResult<()> {
        match self.state {
            AutoAllocationState::PreviewReady(_) => {
                self.state = AutoAllocationState::Idle;
                Ok(())
            }
            ref other => Err(AllocationError::InvalidTransition {
                from: other.name(),
                action: "cancel",
            }),
        }
    }

    /// Return a finished workflow to `Idle` so it can run another pass.
    ///
    /// Only valid from the terminal states (`Done`,
    /// `NoHighConfidenceMatches`).
    pub fn reset(&mut self) -> AllocationResult<()> {
        match self.state {
            AutoAllocationState::Done(_) | AutoAllocationState::NoHighConfidenceMatches => {
                self.state = AutoAllocationState::Idle;
                Ok(())
            }
            ref other => Err(AllocationError::InvalidTransition {
                from: other.name(),
                action: "reset",
            }),
        }
    }

    /// Fetch the immutable snapshot one pass operates on
    async fn snapshot(
        &self,
        project_id: ProjectId,
        estimate_id: EstimateId,
    ) -> AllocationResult<(
        Vec<crate::models::Expense>,
        Vec<crate::models::LineItem>,
        HashSet<ExpenseId>,
    )> {
        let expenses = self.expenses.list_expenses(project_id).await?;
        let line_items = self.line_items.list_line_items(estimate_id).await?;
        let ids: Vec<ExpenseId> = expenses.iter().map(|e| e.id).collect();
        let already_allocated = self.store.active_expense_ids(&ids).await?;
        Ok((expenses, line_items, already_allocated))
    }
}

/// One outcome per previewed candidate, in preview order: re-check conflicts
/// are reported directly, committed results are spliced back in.
fn merge_outcomes(
    candidates: &[Candidate],
    now_allocated: &HashSet<ExpenseId>,
    committed: Vec<CommitOutcome>,
) -> Vec<CommitOutcome> {
    let mut committed = committed.into_iter();
    candidates
        .iter()
        .map(|candidate| {
            if now_allocated.contains(&candidate.expense_id) {
                CommitOutcome::Conflict {
                    expense_id: candidate.expense_id,
                }
            } else {
                committed.next().unwrap_or(CommitOutcome::Failed {
                    expense_id: candidate.expense_id,
                    reason: "missing outcome from batch commit".to_string(),
                })
            }
        })
        .collect()
}
