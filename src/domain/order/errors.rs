use rust_decimal::Decimal;

use super::value_objects::{ItemRef, OrderStatus};

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(i64),

    #[error("Order status not found for order {0}")]
    StatusNotFound(i64),

    #[error("Order status record not found: {0}")]
    StatusRecordNotFound(i64),

    #[error("Food item not found: {0}")]
    ItemNotFound(ItemRef),

    #[error("User not found: {0}")]
    AccountNotFound(i64),

    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(i32),

    #[error("Total price must be greater than 0, got {0}")]
    NonPositiveTotal(Decimal),

    #[error("Total price is too large to represent")]
    TotalOverflow,

    #[error("Total price {0} exceeds the maximum of 99999999.99")]
    TotalOutOfRange(Decimal),

    #[error("Invalid status '{0}', expected one of: pending, processing, completed, cancelled")]
    UnknownStatus(String),

    #[error("Order is already {0} and cannot change status")]
    TerminalStatus(OrderStatus),

    #[error("Cannot move order from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    #[error("Provide exactly one of item_id or food_name")]
    AmbiguousItemRef,
}
