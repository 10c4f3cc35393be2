//! Correlation model
//!
//! A correlation is the persisted link between one expense and one estimate
//! line item. Correlations are created only by a workflow's commit step and
//! are never mutated in place; re-allocating an expense requires an explicit
//! unallocate elsewhere before a new commit can succeed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CorrelationId, ExpenseId, LineItemId};

/// What kind of record an expense was correlated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationType {
    /// Allocated against an estimate line item
    #[default]
    Estimate,
}

impl fmt::Display for CorrelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Estimate => write!(f, "estimate"),
        }
    }
}

/// A persisted expense-to-line-item allocation record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correlation {
    /// Unique identifier
    pub id: CorrelationId,

    /// The allocated expense (at most one active correlation per expense)
    pub expense_id: ExpenseId,

    /// The line item the expense was allocated to
    pub line_item_id: LineItemId,

    /// Record kind
    #[serde(default)]
    pub correlation_type: CorrelationType,

    /// Whether this record came from the auto-allocation workflow
    pub auto_correlated: bool,

    /// Confidence score recorded at commit time, auto-allocations only
    pub confidence_score: Option<u8>,

    /// Free-text notes
    #[serde(default)]
    pub notes: String,

    /// When the record was created
    pub created_at: DateTime<Utc>,
}

/// Commit-input form of a correlation; id and timestamp are assigned at
/// insert time by the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationRequest {
    pub expense_id: ExpenseId,
    pub line_item_id: LineItemId,
    #[serde(default)]
    pub correlation_type: CorrelationType,
    pub auto_correlated: bool,
    pub confidence_score: Option<u8>,
    #[serde(default)]
    pub notes: String,
}

impl CorrelationRequest {
    /// Build a request for an auto-allocation commit
    pub fn auto(expense_id: ExpenseId, line_item_id: LineItemId, confidence_score: u8) -> Self {
        Self {
            expense_id,
            line_item_id,
            correlation_type: CorrelationType::Estimate,
            auto_correlated: true,
            confidence_score: Some(confidence_score),
            notes: String::new(),
        }
    }

    /// Build a request for a manual bulk assignment
    pub fn manual(expense_id: ExpenseId, line_item_id: LineItemId) -> Self {
        Self {
            expense_id,
            line_item_id,
            correlation_type: CorrelationType::Estimate,
            auto_correlated: false,
            confidence_score: None,
            notes: String::new(),
        }
    }

    /// Materialize the stored record this request describes
    pub fn into_correlation(self) -> Correlation {
        Correlation {
            id: CorrelationId::new(),
            expense_id: self.expense_id,
            line_item_id: self.line_item_id,
            correlation_type: self.correlation_type,
            auto_correlated: self.auto_correlated,
            confidence_score: self.confidence_score,
            notes: self.notes,
            created_at: Utc::now(),
        }
    }
}

/// Per-record result of a batch commit.
///
/// A batch is per-record atomic: one record's conflict or failure never
/// blocks its siblings, and every input record gets exactly one outcome.
#[derive(Debug, Clone)]
pub enum CommitOutcome {
    /// The correlation was persisted and the expense marked planned
    Committed(Correlation),
    /// An active correlation already exists for this expense; first writer
    /// wins and is never overwritten
    Conflict { expense_id: ExpenseId },
    /// Transient repository failure; no mutation is assumed to have occurred
    Failed {
        expense_id: ExpenseId,
        reason: String,
    },
}

impl CommitOutcome {
    /// The expense this outcome refers to
    pub fn expense_id(&self) -> ExpenseId {
        match self {
            Self::Committed(correlation) => correlation.expense_id,
            Self::Conflict { expense_id } | Self::Failed { expense_id, .. } => *expense_id,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_request() {
        let expense_id = ExpenseId::new();
        let line_item_id = LineItemId::new();
        let request = CorrelationRequest::auto(expense_id, line_item_id, 82);

        assert!(request.auto_correlated);
        assert_eq!(request.confidence_score, Some(82));
        assert_eq!(request.correlation_type, CorrelationType::Estimate);
    }

    #[test]
    fn test_manual_request_has_no_score() {
        let request = CorrelationRequest::manual(ExpenseId::new(), LineItemId::new());
        assert!(!request.auto_correlated);
        assert_eq!(request.confidence_score, None);
    }

    #[test]
    fn test_into_correlation_preserves_fields() {
        let expense_id = ExpenseId::new();
        let line_item_id = LineItemId::new();
        let correlation = CorrelationRequest::auto(expense_id, line_item_id, 90).into_correlation();

        assert_eq!(correlation.expense_id, expense_id);
        assert_eq!(correlation.line_item_id, line_item_id);
        assert!(correlation.auto_correlated);
        assert_eq!(correlation.confidence_score, Some(90));
    }

    #[test]
    fn test_outcome_accessors() {
        let expense_id = ExpenseId::new();
        let committed = CommitOutcome::Committed(
            CorrelationRequest::manual(expense_id, LineItemId::new()).into_correlation(),
        );
        assert!(committed.is_committed());
        assert_eq!(committed.expense_id(), expense_id);

        let conflict = CommitOutcome::Conflict { expense_id };
        assert!(conflict.is_conflict());
        assert_eq!(conflict.expense_id(), expense_id);
    }

    #[test]
    fn test_correlation_serialization() {
        let correlation =
            CorrelationRequest::auto(ExpenseId::new(), LineItemId::new(), 75).into_correlation();
        let json = serde_json::to_string(&correlation).unwrap();
        let back: Correlation = serde_json::from_str(&json).unwrap();
        assert_eq!(correlation.id, back.id);
        assert_eq!(correlation.confidence_score, back.confidence_score);
    }
}
