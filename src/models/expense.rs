//! Expense model
//!
//! A recorded financial transaction against a project. The allocation engine
//! only ever flips the `planned` flag on an expense; it never deletes one.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::ExpenseCategory;
use super::ids::{ExpenseId, PayeeId, ProjectId};
use super::money::Money;

/// A recorded financial transaction against a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier
    pub id: ExpenseId,

    /// The project this expense was recorded against
    pub project_id: ProjectId,

    /// Expense amount
    pub amount: Money,

    /// Date the expense was incurred
    pub date: NaiveDate,

    /// Free-text description (vendor invoice memo, receipt line, etc.)
    #[serde(default)]
    pub description: Option<String>,

    /// Expense category
    pub category: ExpenseCategory,

    /// Payee reference, when the source transaction identified one
    pub payee_id: Option<PayeeId>,

    /// Set when the expense has been allocated to an estimate line item
    #[serde(default)]
    pub planned: bool,

    /// When the expense was created
    pub created_at: DateTime<Utc>,

    /// When the expense was last modified
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new unallocated expense
    pub fn new(
        project_id: ProjectId,
        amount: Money,
        date: NaiveDate,
        category: ExpenseCategory,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            project_id,
            amount,
            date,
            description: None,
            category,
            payee_id: None,
            planned: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a payee reference
    pub fn with_payee(mut self, payee_id: PayeeId) -> Self {
        self.payee_id = Some(payee_id);
        self
    }

    /// Validate the expense
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if self.amount.is_negative() {
            return Err(ExpenseValidationError::NegativeAmount(self.amount));
        }
        if let Some(desc) = &self.description {
            if desc.len() > 500 {
                return Err(ExpenseValidationError::DescriptionTooLong(desc.len()));
            }
        }
        Ok(())
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    NegativeAmount(Money),
    DescriptionTooLong(usize),
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeAmount(amount) => {
                write!(f, "Expense amount cannot be negative: {}", amount)
            }
            Self::DescriptionTooLong(len) => {
                write!(f, "Expense description too long ({} chars, max 500)", len)
            }
        }
    }
}

impl std::error::Error for ExpenseValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_expense() -> Expense {
        Expense::new(
            ProjectId::new(),
            Money::from_cents(125_000),
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            ExpenseCategory::Materials,
        )
    }

    #[test]
    fn test_new_expense_is_unplanned() {
        let expense = test_expense();
        assert!(!expense.planned);
        assert!(expense.description.is_none());
        assert!(expense.payee_id.is_none());
    }

    #[test]
    fn test_builders() {
        let payee = PayeeId::new();
        let expense = test_expense()
            .with_description("lumber delivery")
            .with_payee(payee);
        assert_eq!(expense.description.as_deref(), Some("lumber delivery"));
        assert_eq!(expense.payee_id, Some(payee));
    }

    #[test]
    fn test_validation() {
        let mut expense = test_expense();
        assert!(expense.validate().is_ok());

        expense.amount = Money::from_cents(-100);
        assert!(matches!(
            expense.validate(),
            Err(ExpenseValidationError::NegativeAmount(_))
        ));

        expense.amount = Money::from_cents(100);
        expense.description = Some("x".repeat(501));
        assert!(matches!(
            expense.validate(),
            Err(ExpenseValidationError::DescriptionTooLong(_))
        ));
    }

    #[test]
    fn test_serialization_round_trip() {
        let expense = test_expense().with_description("drywall install");
        let json = serde_json::to_string(&expense).unwrap();
        let back: Expense = serde_json::from_str(&json).unwrap();
        assert_eq!(expense.id, back.id);
        assert_eq!(expense.amount, back.amount);
        assert_eq!(expense.category, back.category);
        assert_eq!(expense.description, back.description);
    }
}
