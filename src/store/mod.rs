//! Storage abstraction for the catalog, accounts, orders and the status ledger.
//!
//! A [`Store`] hands out one [`UnitOfWork`] per request. Every workflow
//! operation receives that scope explicitly and performs all of its reads and
//! writes through it. Nothing is persisted until [`UnitOfWork::commit`] is
//! called; dropping the scope on an error path rolls everything back and
//! releases the underlying connection.
//!
//! Two implementations are provided:
//!
//! - [`PgStore`]: PostgreSQL via a sqlx connection pool
//! - [`MemoryStore`]: in-process tables for local runs and tests

mod memory;
mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::domain::account::{Account, NewAccount};
use crate::domain::catalog::{CatalogItem, CatalogItemDraft};
use crate::domain::order::{NewOrder, NewOrderStatus, Order, OrderStatus, OrderStatusRecord};

// Constraint names shared by the migration and the in-memory store.
pub const USERS_USER_NAME_KEY: &str = "users_user_name_key";
pub const USERS_EMAIL_KEY: &str = "users_email_key";
pub const ORDERS_ITEM_ID_FKEY: &str = "orders_item_id_fkey";
pub const ORDERS_USER_ID_FKEY: &str = "orders_user_id_fkey";
pub const ORDER_STATUS_ORDER_ID_KEY: &str = "order_status_order_id_key";
pub const ORDER_STATUS_ORDER_ID_FKEY: &str = "order_status_order_id_fkey";
pub const CHECK_PRICE_POSITIVE: &str = "check_price_positive";
pub const CHECK_QUANTITY_POSITIVE: &str = "check_quantity_positive";
pub const CHECK_TOTAL_PRICE_POSITIVE: &str = "check_total_price_positive";
pub const CHECK_STATUS_TOTAL_PRICE_POSITIVE: &str = "check_status_total_price_positive";

/// SQLSTATE raised when a value does not fit its NUMERIC column.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage failures, with constraint violations pulled out of the raw
/// database error so the request boundary can classify them.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("check constraint violated: {0}")]
    CheckViolation(String),

    #[error("numeric value out of range: {0}")]
    OutOfRange(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            match db_err.kind() {
                sqlx::error::ErrorKind::UniqueViolation => {
                    return StoreError::UniqueViolation(constraint)
                }
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    return StoreError::ForeignKeyViolation(constraint)
                }
                sqlx::error::ErrorKind::CheckViolation => {
                    return StoreError::CheckViolation(constraint)
                }
                _ => {}
            }
            if db_err.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) {
                return StoreError::OutOfRange(db_err.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

/// Source of per-request units of work.
#[async_trait]
pub trait Store: Send + Sync {
    /// Acquire a connection and open a transaction on it.
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>>;

    /// Short backend label for logs and the health endpoint.
    fn backend(&self) -> &'static str;
}

/// A transactional scope over all four tables.
///
/// Implementations enforce the same rules the schema does: unique user names
/// and emails, positive prices/quantities/totals, one status row per order,
/// foreign keys, and cascading deletes from accounts and catalog items down
/// to orders and their status rows.
#[async_trait]
pub trait UnitOfWork: Send {
    // Catalog
    async fn insert_catalog_item(&mut self, item: &CatalogItemDraft) -> StoreResult<CatalogItem>;
    async fn find_catalog_item(&mut self, id: i64) -> StoreResult<Option<CatalogItem>>;
    /// Exact match; the lowest id wins when names repeat.
    async fn find_catalog_item_by_name(&mut self, food_name: &str) -> StoreResult<Option<CatalogItem>>;
    async fn list_catalog_items(&mut self) -> StoreResult<Vec<CatalogItem>>;
    async fn update_catalog_item(
        &mut self,
        id: i64,
        item: &CatalogItemDraft,
    ) -> StoreResult<Option<CatalogItem>>;
    async fn delete_catalog_item(&mut self, id: i64) -> StoreResult<bool>;

    // Accounts
    async fn insert_account(&mut self, account: &NewAccount) -> StoreResult<Account>;
    async fn find_account(&mut self, id: i64) -> StoreResult<Option<Account>>;
    async fn find_account_by_name(&mut self, user_name: &str) -> StoreResult<Option<Account>>;
    async fn update_account(&mut self, id: i64, account: &NewAccount) -> StoreResult<Option<Account>>;
    async fn delete_account(&mut self, id: i64) -> StoreResult<bool>;

    // Orders
    async fn insert_order(&mut self, order: &NewOrder) -> StoreResult<Order>;
    async fn find_order(&mut self, id: i64) -> StoreResult<Option<Order>>;
    async fn list_orders(&mut self) -> StoreResult<Vec<Order>>;
    async fn list_orders_for_account(&mut self, user_id: i64) -> StoreResult<Vec<Order>>;
    async fn set_order_total(&mut self, id: i64, total_price: Decimal) -> StoreResult<()>;

    // Status ledger
    async fn insert_order_status(&mut self, status: &NewOrderStatus) -> StoreResult<OrderStatusRecord>;
    async fn find_order_status(&mut self, id: i64) -> StoreResult<Option<OrderStatusRecord>>;
    async fn find_order_status_by_order(&mut self, order_id: i64) -> StoreResult<Option<OrderStatusRecord>>;
    async fn set_order_status(
        &mut self,
        order_id: i64,
        status: OrderStatus,
    ) -> StoreResult<Option<OrderStatusRecord>>;

    /// Make every write in this scope durable.
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
