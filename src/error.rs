//! Error types for the allocation engine
//!
//! Conflicts are deliberately not represented here: an expense that already
//! carries an active correlation surfaces as a per-record
//! [`CommitOutcome::Conflict`](crate::models::CommitOutcome) from a batch
//! commit, never as an error that aborts its siblings.

use thiserror::Error;

/// The main error type for allocation operations
#[derive(Error, Debug)]
pub enum AllocationError {
    /// Malformed or empty input, rejected before any I/O
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity lookup failures (unknown line item, expense, etc.)
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// An operation was requested from a workflow state that does not allow it
    #[error("Cannot {action} from the {from} state")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },

    /// Transient repository failure (network, storage)
    #[error("Repository error: {0}")]
    Repository(String),
}

impl AllocationError {
    /// Create a "not found" error for line items
    pub fn line_item_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Line item",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for expenses
    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type alias for allocation operations
pub type AllocationResult<T> = Result<T, AllocationError>;
