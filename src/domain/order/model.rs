use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::value_objects::OrderStatus;

// ============================================================================
// Order Records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub item_id: i64,
    pub quantity: i32,
    /// Copied from the catalog when the order is placed, never re-derived.
    pub food_name: String,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub item_id: i64,
    pub quantity: i32,
    pub food_name: String,
    pub total_price: Decimal,
}

/// One row of the status ledger. Exactly one exists per order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderStatusRecord {
    pub id: i64,
    pub order_id: i64,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    pub total_price: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrderStatus {
    pub order_id: i64,
    pub status: OrderStatus,
    pub total_price: Decimal,
}

/// What a successful placement hands back: the order and its ledger entry.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    #[serde(flatten)]
    pub order: Order,
    pub status: OrderStatusRecord,
}
