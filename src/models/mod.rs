//! Core data models for the allocation engine

pub mod category;
pub mod correlation;
pub mod expense;
pub mod ids;
pub mod line_item;
pub mod money;

pub use category::{ExpenseCategory, LineItemCategory};
pub use correlation::{
    CommitOutcome, Correlation, CorrelationRequest, CorrelationType,
};
pub use expense::{Expense, ExpenseValidationError};
pub use ids::{CorrelationId, EstimateId, ExpenseId, LineItemId, PayeeId, ProjectId};
pub use line_item::LineItem;
pub use money::Money;
