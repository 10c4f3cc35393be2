//! Expense and line-item category enums
//!
//! Expenses and estimate line items are categorized independently; the
//! [`CategoryCompatibilityMap`](crate::matching::CategoryCompatibilityMap)
//! decides which pairs may be matched.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a recorded project expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Materials,
    Labor,
    Equipment,
    Subcontractor,
    Permits,
    Overhead,
    Other,
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Materials => write!(f, "Materials"),
            Self::Labor => write!(f, "Labor"),
            Self::Equipment => write!(f, "Equipment"),
            Self::Subcontractor => write!(f, "Subcontractor"),
            Self::Permits => write!(f, "Permits"),
            Self::Overhead => write!(f, "Overhead"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// Category of a budgeted estimate line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineItemCategory {
    Materials,
    Labor,
    Equipment,
    Subcontractor,
    Permits,
    Overhead,
}

impl fmt::Display for LineItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Materials => write!(f, "Materials"),
            Self::Labor => write!(f, "Labor"),
            Self::Equipment => write!(f, "Equipment"),
            Self::Subcontractor => write!(f, "Subcontractor"),
            Self::Permits => write!(f, "Permits"),
            Self::Overhead => write!(f, "Overhead"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&ExpenseCategory::Subcontractor).unwrap();
        assert_eq!(json, "\"subcontractor\"");
        let back: ExpenseCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ExpenseCategory::Subcontractor);
    }

    #[test]
    fn test_display() {
        assert_eq!(ExpenseCategory::Materials.to_string(), "Materials");
        assert_eq!(LineItemCategory::Labor.to_string(), "Labor");
    }
}
