//! PostgreSQL store implementation.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

use super::{Store, StoreResult, UnitOfWork};
use crate::domain::account::{Account, NewAccount};
use crate::domain::catalog::{CatalogItem, CatalogItemDraft};
use crate::domain::order::{NewOrder, NewOrderStatus, Order, OrderStatus, OrderStatusRecord};

const CATALOG_COLUMNS: &str = "id, food_name, category, description, price";
const ACCOUNT_COLUMNS: &str = "id, user_name, email, password_hash";
const ORDER_COLUMNS: &str = "id, user_id, item_id, quantity, food_name, total_price, created_at";
const STATUS_COLUMNS: &str = "id, order_id, status, total_price, updated_at";

/// PostgreSQL-backed store for production use.
///
/// Every unit of work is one database transaction on a pooled connection.
/// Uniqueness, check and foreign-key rules live in the schema under
/// `migrations/`; violations surface as the matching [`super::StoreError`]
/// variant carrying the constraint name.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new PostgreSQL store from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

/// A unit of work wrapping a PostgreSQL transaction.
///
/// Dropping without [`UnitOfWork::commit`] rolls the transaction back.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn insert_catalog_item(&mut self, item: &CatalogItemDraft) -> StoreResult<CatalogItem> {
        let query = format!(
            "INSERT INTO food_items (food_name, category, description, price)
             VALUES ($1, $2, $3, $4)
             RETURNING {CATALOG_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CatalogItem>(&query)
            .bind(&item.food_name)
            .bind(&item.category)
            .bind(&item.description)
            .bind(item.price)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn find_catalog_item(&mut self, id: i64) -> StoreResult<Option<CatalogItem>> {
        let query = format!("SELECT {CATALOG_COLUMNS} FROM food_items WHERE id = $1");
        let row = sqlx::query_as::<_, CatalogItem>(&query)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn find_catalog_item_by_name(&mut self, food_name: &str) -> StoreResult<Option<CatalogItem>> {
        let query = format!(
            "SELECT {CATALOG_COLUMNS} FROM food_items WHERE food_name = $1 ORDER BY id LIMIT 1"
        );
        let row = sqlx::query_as::<_, CatalogItem>(&query)
            .bind(food_name)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn list_catalog_items(&mut self) -> StoreResult<Vec<CatalogItem>> {
        let query = format!("SELECT {CATALOG_COLUMNS} FROM food_items ORDER BY id");
        let rows = sqlx::query_as::<_, CatalogItem>(&query)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn update_catalog_item(
        &mut self,
        id: i64,
        item: &CatalogItemDraft,
    ) -> StoreResult<Option<CatalogItem>> {
        let query = format!(
            "UPDATE food_items
             SET food_name = $2, category = $3, description = $4, price = $5
             WHERE id = $1
             RETURNING {CATALOG_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CatalogItem>(&query)
            .bind(id)
            .bind(&item.food_name)
            .bind(&item.category)
            .bind(&item.description)
            .bind(item.price)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn delete_catalog_item(&mut self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM food_items WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_account(&mut self, account: &NewAccount) -> StoreResult<Account> {
        let query = format!(
            "INSERT INTO users (user_name, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Account>(&query)
            .bind(&account.user_name)
            .bind(&account.email)
            .bind(&account.password_hash)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn find_account(&mut self, id: i64) -> StoreResult<Option<Account>> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn find_account_by_name(&mut self, user_name: &str) -> StoreResult<Option<Account>> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE user_name = $1");
        let row = sqlx::query_as::<_, Account>(&query)
            .bind(user_name)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn update_account(&mut self, id: i64, account: &NewAccount) -> StoreResult<Option<Account>> {
        let query = format!(
            "UPDATE users
             SET user_name = $2, email = $3, password_hash = $4
             WHERE id = $1
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(&account.user_name)
            .bind(&account.email)
            .bind(&account.password_hash)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn delete_account(&mut self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_order(&mut self, order: &NewOrder) -> StoreResult<Order> {
        let query = format!(
            "INSERT INTO orders (user_id, item_id, quantity, food_name, total_price)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Order>(&query)
            .bind(order.user_id)
            .bind(order.item_id)
            .bind(order.quantity)
            .bind(&order.food_name)
            .bind(order.total_price)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn find_order(&mut self, id: i64) -> StoreResult<Option<Order>> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn list_orders(&mut self) -> StoreResult<Vec<Order>> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY id");
        let rows = sqlx::query_as::<_, Order>(&query)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn list_orders_for_account(&mut self, user_id: i64) -> StoreResult<Vec<Order>> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, Order>(&query)
            .bind(user_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn set_order_total(&mut self, id: i64, total_price: Decimal) -> StoreResult<()> {
        sqlx::query("UPDATE orders SET total_price = $2 WHERE id = $1")
            .bind(id)
            .bind(total_price)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn insert_order_status(&mut self, status: &NewOrderStatus) -> StoreResult<OrderStatusRecord> {
        let query = format!(
            "INSERT INTO order_status (order_id, status, total_price)
             VALUES ($1, $2, $3)
             RETURNING {STATUS_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderStatusRecord>(&query)
            .bind(status.order_id)
            .bind(status.status.as_str())
            .bind(status.total_price)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn find_order_status(&mut self, id: i64) -> StoreResult<Option<OrderStatusRecord>> {
        let query = format!("SELECT {STATUS_COLUMNS} FROM order_status WHERE id = $1");
        let row = sqlx::query_as::<_, OrderStatusRecord>(&query)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn find_order_status_by_order(&mut self, order_id: i64) -> StoreResult<Option<OrderStatusRecord>> {
        let query = format!("SELECT {STATUS_COLUMNS} FROM order_status WHERE order_id = $1");
        let row = sqlx::query_as::<_, OrderStatusRecord>(&query)
            .bind(order_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn set_order_status(
        &mut self,
        order_id: i64,
        status: OrderStatus,
    ) -> StoreResult<Option<OrderStatusRecord>> {
        let query = format!(
            "UPDATE order_status
             SET status = $2, updated_at = now()
             WHERE order_id = $1
             RETURNING {STATUS_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderStatusRecord>(&query)
            .bind(order_id)
            .bind(status.as_str())
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let PgUnitOfWork { tx } = *self;
        tx.commit().await?;
        Ok(())
    }
}
