use super::errors::OrderError;
use super::value_objects::{validate_quantity, ItemRef, OrderStatus};

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceOrder {
    pub user_id: i64,
    pub item: ItemRef,
    pub quantity: i32,
}

impl PlaceOrder {
    /// Build from the loose request shape, where the item is named either by id
    /// or by exact food name (but not both).
    pub fn from_parts(
        user_id: i64,
        item_id: Option<i64>,
        food_name: Option<String>,
        quantity: i32,
    ) -> Result<Self, OrderError> {
        let item = match (item_id, food_name) {
            (Some(id), None) => ItemRef::Id(id),
            (None, Some(name)) if !name.trim().is_empty() => ItemRef::Name(name),
            _ => return Err(OrderError::AmbiguousItemRef),
        };

        validate_quantity(quantity)?;

        Ok(Self {
            user_id,
            item,
            quantity,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateOrderStatus {
    pub order_id: i64,
    pub status: OrderStatus,
}

impl UpdateOrderStatus {
    pub fn parse(order_id: i64, raw_status: &str) -> Result<Self, OrderError> {
        Ok(Self {
            order_id,
            status: raw_status.parse()?,
        })
    }
}
