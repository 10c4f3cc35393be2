//! Line item model
//!
//! A planned budget entry within an approved estimate. Line items are owned
//! by the estimate subsystem and are immutable from the allocation engine's
//! perspective.

use serde::{Deserialize, Serialize};

use super::category::LineItemCategory;
use super::ids::{EstimateId, LineItemId};
use super::money::Money;

/// A planned budget entry within an approved estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique identifier
    pub id: LineItemId,

    /// The estimate this line item belongs to
    pub estimate_id: EstimateId,

    /// Line item category
    pub category: LineItemCategory,

    /// Description of the budgeted work or material
    pub description: String,

    /// Budgeted quantity (units depend on the line item)
    pub quantity: f64,

    /// Customer-facing price per unit
    pub unit_price: Money,

    /// Internal cost per unit
    pub unit_cost: Money,
}

impl LineItem {
    /// Create a new line item
    pub fn new(
        estimate_id: EstimateId,
        category: LineItemCategory,
        description: impl Into<String>,
        quantity: f64,
        unit_price: Money,
        unit_cost: Money,
    ) -> Self {
        Self {
            id: LineItemId::new(),
            estimate_id,
            category,
            description: description.into(),
            quantity,
            unit_price,
            unit_cost,
        }
    }

    /// Total budgeted cost: `quantity × unit_cost`
    pub fn total_cost(&self) -> Money {
        self.unit_cost.mul_quantity(self.quantity)
    }

    /// Total budgeted price: `quantity × unit_price`
    pub fn total(&self) -> Money {
        self.unit_price.mul_quantity(self.quantity)
    }

    /// Markup over cost: `total − total_cost`
    pub fn total_markup(&self) -> Money {
        self.total() - self.total_cost()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framing_item() -> LineItem {
        LineItem::new(
            EstimateId::new(),
            LineItemCategory::Materials,
            "framing lumber package",
            40.0,
            Money::from_cents(3_500), // $35.00/unit price
            Money::from_cents(2_500), // $25.00/unit cost
        )
    }

    #[test]
    fn test_derived_totals() {
        let item = framing_item();
        assert_eq!(item.total_cost().cents(), 100_000);
        assert_eq!(item.total().cents(), 140_000);
        assert_eq!(item.total_markup().cents(), 40_000);
    }

    #[test]
    fn test_fractional_quantity() {
        let mut item = framing_item();
        item.quantity = 2.5;
        assert_eq!(item.total_cost().cents(), 6_250);
    }

    #[test]
    fn test_zero_quantity_has_zero_cost() {
        let mut item = framing_item();
        item.quantity = 0.0;
        assert!(item.total_cost().is_zero());
        assert!(item.total_markup().is_zero());
    }

    #[test]
    fn test_serialization_round_trip() {
        let item = framing_item();
        let json = serde_json::to_string(&item).unwrap();
        let back: LineItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item.id, back.id);
        assert_eq!(item.total_cost(), back.total_cost());
    }
}
