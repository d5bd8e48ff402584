use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::OrderError;
use crate::domain::catalog::max_amount;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Lifecycle value stored in the status ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Lifecycle graph used when strict transitions are switched on.
    ///
    /// pending → processing | cancelled
    /// processing → completed | cancelled
    /// completed, cancelled → (nothing)
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Processing)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Processing, OrderStatus::Completed)
                | (OrderStatus::Processing, OrderStatus::Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| OrderError::UnknownStatus(value.to_string()))
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = OrderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How the caller points at the catalog item being ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRef {
    Id(i64),
    Name(String),
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Id(id) => write!(f, "id {id}"),
            ItemRef::Name(name) => write!(f, "name '{name}'"),
        }
    }
}

pub fn validate_quantity(quantity: i32) -> Result<(), OrderError> {
    if quantity < 1 {
        return Err(OrderError::InvalidQuantity(quantity));
    }
    Ok(())
}

/// `unit_price × quantity`, rejecting anything that is not strictly positive
/// or that does not fit the price column.
pub fn compute_total(unit_price: Decimal, quantity: i32) -> Result<Decimal, OrderError> {
    validate_quantity(quantity)?;

    let total = unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or(OrderError::TotalOverflow)?;

    if total <= Decimal::ZERO {
        return Err(OrderError::NonPositiveTotal(total));
    }
    if total > max_amount() {
        return Err(OrderError::TotalOutOfRange(total));
    }

    Ok(total)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_status_parse() {
        assert_eq!("pending".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!("processing".parse::<OrderStatus>().unwrap(), OrderStatus::Processing);
        assert_eq!("completed".parse::<OrderStatus>().unwrap(), OrderStatus::Completed);
        assert_eq!("cancelled".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
    }

    #[test]
    fn test_order_status_rejects_unknown_values() {
        for value in ["shipped", "Pending", "", " pending"] {
            let result = value.parse::<OrderStatus>();
            assert!(matches!(result, Err(OrderError::UnknownStatus(ref v)) if v == value));
        }
    }

    #[test]
    fn test_order_status_serialization() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");

        let status: OrderStatus = serde_json::from_str("\"processing\"").unwrap();
        assert_eq!(status, OrderStatus::Processing);
    }

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_lifecycle_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));

        for next in OrderStatus::ALL {
            assert!(!OrderStatus::Completed.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_compute_total() {
        assert_eq!(compute_total(dec!(5.00), 3).unwrap(), dec!(15.00));
        assert_eq!(compute_total(dec!(0.01), 1).unwrap(), dec!(0.01));
    }

    #[test]
    fn test_compute_total_rejects_bad_input() {
        assert!(matches!(compute_total(dec!(5.00), 0), Err(OrderError::InvalidQuantity(0))));
        assert!(matches!(compute_total(dec!(5.00), -2), Err(OrderError::InvalidQuantity(-2))));
        assert!(matches!(compute_total(dec!(0), 2), Err(OrderError::NonPositiveTotal(_))));
    }

    #[test]
    fn test_compute_total_respects_column_bound() {
        assert_eq!(compute_total(dec!(9999999.99), 10).unwrap(), dec!(99999999.90));
        assert!(matches!(
            compute_total(dec!(5.00), 20_000_000),
            Err(OrderError::TotalOutOfRange(_))
        ));
        assert!(matches!(
            compute_total(dec!(99999999.99), i32::MAX),
            Err(OrderError::TotalOutOfRange(_))
        ));
    }

    #[test]
    fn test_item_ref_display() {
        assert_eq!(ItemRef::Id(7).to_string(), "id 7");
        assert_eq!(ItemRef::Name("Burger".into()).to_string(), "name 'Burger'");
    }
}
