//! In-memory store implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{
    Store, StoreError, StoreResult, UnitOfWork, CHECK_PRICE_POSITIVE, CHECK_QUANTITY_POSITIVE,
    CHECK_STATUS_TOTAL_PRICE_POSITIVE, CHECK_TOTAL_PRICE_POSITIVE, ORDERS_ITEM_ID_FKEY,
    ORDERS_USER_ID_FKEY, ORDER_STATUS_ORDER_ID_FKEY, ORDER_STATUS_ORDER_ID_KEY, USERS_EMAIL_KEY,
    USERS_USER_NAME_KEY,
};
use crate::domain::account::{Account, NewAccount};
use crate::domain::catalog::{max_amount, CatalogItem, CatalogItemDraft};
use crate::domain::order::{NewOrder, NewOrderStatus, Order, OrderStatus, OrderStatusRecord};

#[derive(Debug, Clone, Default)]
struct Tables {
    food_items: BTreeMap<i64, CatalogItem>,
    users: BTreeMap<i64, Account>,
    orders: BTreeMap<i64, Order>,
    order_status: BTreeMap<i64, OrderStatusRecord>,
    sequences: Sequences,
}

#[derive(Debug, Clone, Default)]
struct Sequences {
    food_items: i64,
    users: i64,
    orders: i64,
    order_status: i64,
}

fn next_id(sequence: &mut i64) -> i64 {
    *sequence += 1;
    *sequence
}

/// In-memory store for local runs and tests.
///
/// Units of work are serialized: `begin` takes an exclusive lock and works
/// on a copy of the tables, which `commit` writes back. Dropping the unit of
/// work discards the copy and releases the lock.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let guard = self.tables.clone().lock_owned().await;
        let work = (*guard).clone();
        Ok(Box::new(MemoryUnitOfWork { guard, work }))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    work: Tables,
}

impl MemoryUnitOfWork {
    fn check_account_unique(&self, account: &NewAccount, except: Option<i64>) -> StoreResult<()> {
        for (id, existing) in &self.work.users {
            if Some(*id) == except {
                continue;
            }
            if existing.user_name == account.user_name {
                return Err(StoreError::UniqueViolation(USERS_USER_NAME_KEY.to_string()));
            }
            if existing.email == account.email {
                return Err(StoreError::UniqueViolation(USERS_EMAIL_KEY.to_string()));
            }
        }
        Ok(())
    }

    /// Remove orders matching `predicate` together with their status rows.
    fn cascade_orders(&mut self, predicate: impl Fn(&Order) -> bool) {
        let doomed: Vec<i64> = self
            .work
            .orders
            .values()
            .filter(|order| predicate(order))
            .map(|order| order.id)
            .collect();

        for order_id in &doomed {
            self.work.orders.remove(order_id);
        }
        self.work
            .order_status
            .retain(|_, status| !doomed.contains(&status.order_id));
    }
}

/// Positive and within NUMERIC(10, 2), as the migration declares.
fn check_amount(value: Decimal, constraint: &str, column: &str) -> StoreResult<()> {
    if value <= Decimal::ZERO {
        return Err(StoreError::CheckViolation(constraint.to_string()));
    }
    if value > max_amount() {
        return Err(StoreError::OutOfRange(column.to_string()));
    }
    Ok(())
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn insert_catalog_item(&mut self, item: &CatalogItemDraft) -> StoreResult<CatalogItem> {
        check_amount(item.price, CHECK_PRICE_POSITIVE, "food_items.price")?;

        let row = CatalogItem {
            id: next_id(&mut self.work.sequences.food_items),
            food_name: item.food_name.clone(),
            category: item.category.clone(),
            description: item.description.clone(),
            price: item.price,
        };
        self.work.food_items.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_catalog_item(&mut self, id: i64) -> StoreResult<Option<CatalogItem>> {
        Ok(self.work.food_items.get(&id).cloned())
    }

    async fn find_catalog_item_by_name(&mut self, food_name: &str) -> StoreResult<Option<CatalogItem>> {
        Ok(self
            .work
            .food_items
            .values()
            .find(|item| item.food_name == food_name)
            .cloned())
    }

    async fn list_catalog_items(&mut self) -> StoreResult<Vec<CatalogItem>> {
        Ok(self.work.food_items.values().cloned().collect())
    }

    async fn update_catalog_item(
        &mut self,
        id: i64,
        item: &CatalogItemDraft,
    ) -> StoreResult<Option<CatalogItem>> {
        if !self.work.food_items.contains_key(&id) {
            return Ok(None);
        }
        check_amount(item.price, CHECK_PRICE_POSITIVE, "food_items.price")?;

        let row = CatalogItem {
            id,
            food_name: item.food_name.clone(),
            category: item.category.clone(),
            description: item.description.clone(),
            price: item.price,
        };
        self.work.food_items.insert(id, row.clone());
        Ok(Some(row))
    }

    async fn delete_catalog_item(&mut self, id: i64) -> StoreResult<bool> {
        if self.work.food_items.remove(&id).is_none() {
            return Ok(false);
        }
        self.cascade_orders(|order| order.item_id == id);
        Ok(true)
    }

    async fn insert_account(&mut self, account: &NewAccount) -> StoreResult<Account> {
        self.check_account_unique(account, None)?;

        let row = Account {
            id: next_id(&mut self.work.sequences.users),
            user_name: account.user_name.clone(),
            email: account.email.clone(),
            password_hash: account.password_hash.clone(),
        };
        self.work.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_account(&mut self, id: i64) -> StoreResult<Option<Account>> {
        Ok(self.work.users.get(&id).cloned())
    }

    async fn find_account_by_name(&mut self, user_name: &str) -> StoreResult<Option<Account>> {
        Ok(self
            .work
            .users
            .values()
            .find(|account| account.user_name == user_name)
            .cloned())
    }

    async fn update_account(&mut self, id: i64, account: &NewAccount) -> StoreResult<Option<Account>> {
        if !self.work.users.contains_key(&id) {
            return Ok(None);
        }
        self.check_account_unique(account, Some(id))?;

        let row = Account {
            id,
            user_name: account.user_name.clone(),
            email: account.email.clone(),
            password_hash: account.password_hash.clone(),
        };
        self.work.users.insert(id, row.clone());
        Ok(Some(row))
    }

    async fn delete_account(&mut self, id: i64) -> StoreResult<bool> {
        if self.work.users.remove(&id).is_none() {
            return Ok(false);
        }
        self.cascade_orders(|order| order.user_id == id);
        Ok(true)
    }

    async fn insert_order(&mut self, order: &NewOrder) -> StoreResult<Order> {
        if !self.work.food_items.contains_key(&order.item_id) {
            return Err(StoreError::ForeignKeyViolation(ORDERS_ITEM_ID_FKEY.to_string()));
        }
        if !self.work.users.contains_key(&order.user_id) {
            return Err(StoreError::ForeignKeyViolation(ORDERS_USER_ID_FKEY.to_string()));
        }
        if order.quantity <= 0 {
            return Err(StoreError::CheckViolation(CHECK_QUANTITY_POSITIVE.to_string()));
        }
        check_amount(order.total_price, CHECK_TOTAL_PRICE_POSITIVE, "orders.total_price")?;

        let row = Order {
            id: next_id(&mut self.work.sequences.orders),
            user_id: order.user_id,
            item_id: order.item_id,
            quantity: order.quantity,
            food_name: order.food_name.clone(),
            total_price: order.total_price,
            created_at: Utc::now(),
        };
        self.work.orders.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_order(&mut self, id: i64) -> StoreResult<Option<Order>> {
        Ok(self.work.orders.get(&id).cloned())
    }

    async fn list_orders(&mut self) -> StoreResult<Vec<Order>> {
        Ok(self.work.orders.values().cloned().collect())
    }

    async fn list_orders_for_account(&mut self, user_id: i64) -> StoreResult<Vec<Order>> {
        Ok(self
            .work
            .orders
            .values()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn set_order_total(&mut self, id: i64, total_price: Decimal) -> StoreResult<()> {
        check_amount(total_price, CHECK_TOTAL_PRICE_POSITIVE, "orders.total_price")?;
        if let Some(order) = self.work.orders.get_mut(&id) {
            order.total_price = total_price;
        }
        Ok(())
    }

    async fn insert_order_status(&mut self, status: &NewOrderStatus) -> StoreResult<OrderStatusRecord> {
        if !self.work.orders.contains_key(&status.order_id) {
            return Err(StoreError::ForeignKeyViolation(ORDER_STATUS_ORDER_ID_FKEY.to_string()));
        }
        if self
            .work
            .order_status
            .values()
            .any(|existing| existing.order_id == status.order_id)
        {
            return Err(StoreError::UniqueViolation(ORDER_STATUS_ORDER_ID_KEY.to_string()));
        }
        check_amount(status.total_price, CHECK_STATUS_TOTAL_PRICE_POSITIVE, "order_status.total_price")?;

        let row = OrderStatusRecord {
            id: next_id(&mut self.work.sequences.order_status),
            order_id: status.order_id,
            status: status.status,
            total_price: status.total_price,
            updated_at: Utc::now(),
        };
        self.work.order_status.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_order_status(&mut self, id: i64) -> StoreResult<Option<OrderStatusRecord>> {
        Ok(self.work.order_status.get(&id).cloned())
    }

    async fn find_order_status_by_order(&mut self, order_id: i64) -> StoreResult<Option<OrderStatusRecord>> {
        Ok(self
            .work
            .order_status
            .values()
            .find(|status| status.order_id == order_id)
            .cloned())
    }

    async fn set_order_status(
        &mut self,
        order_id: i64,
        status: OrderStatus,
    ) -> StoreResult<Option<OrderStatusRecord>> {
        let Some(row) = self
            .work
            .order_status
            .values_mut()
            .find(|row| row.order_id == order_id)
        else {
            return Ok(None);
        };

        row.status = status;
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryUnitOfWork { mut guard, work } = *self;
        *guard = work;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account(name: &str) -> NewAccount {
        NewAccount {
            user_name: name.into(),
            email: format!("{name}@example.com"),
            password_hash: "hash".into(),
        }
    }

    async fn seed_order(uow: &mut dyn UnitOfWork) -> (Account, CatalogItem, Order, OrderStatusRecord) {
        let user = uow.insert_account(&account("jane")).await.unwrap();
        let item = uow
            .insert_catalog_item(&CatalogItemDraft::new("Burger", dec!(5.00)))
            .await
            .unwrap();
        let order = uow
            .insert_order(&NewOrder {
                user_id: user.id,
                item_id: item.id,
                quantity: 2,
                food_name: item.food_name.clone(),
                total_price: dec!(10.00),
            })
            .await
            .unwrap();
        let status = uow
            .insert_order_status(&NewOrderStatus {
                order_id: order.id,
                status: OrderStatus::Pending,
                total_price: dec!(10.00),
            })
            .await
            .unwrap();
        (user, item, order, status)
    }

    #[tokio::test]
    async fn test_commit_persists_and_drop_rolls_back() {
        let store = MemoryStore::new();

        let mut uow = store.begin().await.unwrap();
        uow.insert_account(&account("kept")).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        uow.insert_account(&account("discarded")).await.unwrap();
        drop(uow);

        let mut uow = store.begin().await.unwrap();
        assert!(uow.find_account_by_name("kept").await.unwrap().is_some());
        assert!(uow.find_account_by_name("discarded").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_constraints() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let jane = uow.insert_account(&account("jane")).await.unwrap();

        let mut same_email = account("john");
        same_email.email = jane.email.clone();
        let err = uow.insert_account(&same_email).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(ref c) if c == USERS_EMAIL_KEY));

        let err = uow.insert_account(&account("jane")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(ref c) if c == USERS_USER_NAME_KEY));

        // Rewriting your own row with unchanged values is fine.
        let updated = uow.update_account(jane.id, &account("jane")).await.unwrap();
        assert!(updated.is_some());
    }

    #[tokio::test]
    async fn test_foreign_key_and_check_constraints() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();

        let err = uow
            .insert_order(&NewOrder {
                user_id: 1,
                item_id: 1,
                quantity: 1,
                food_name: "Ghost".into(),
                total_price: dec!(1.00),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));

        let err = uow
            .insert_catalog_item(&CatalogItemDraft::new("Free", dec!(0)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CheckViolation(ref c) if c == CHECK_PRICE_POSITIVE));

        let (_, _, order, _) = seed_order(&mut *uow).await;
        let err = uow
            .insert_order_status(&NewOrderStatus {
                order_id: order.id,
                status: OrderStatus::Pending,
                total_price: dec!(10.00),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(ref c) if c == ORDER_STATUS_ORDER_ID_KEY));
    }

    #[tokio::test]
    async fn test_amounts_beyond_numeric_column_are_rejected() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let (user, item, order, _) = seed_order(&mut *uow).await;

        let err = uow
            .insert_order(&NewOrder {
                user_id: user.id,
                item_id: item.id,
                quantity: 20_000_000,
                food_name: item.food_name.clone(),
                total_price: dec!(100000000.00),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::OutOfRange(ref c) if c == "orders.total_price"));

        let err = uow.set_order_total(order.id, dec!(100000000.00)).await.unwrap_err();
        assert!(matches!(err, StoreError::OutOfRange(_)));
        uow.set_order_total(order.id, dec!(99999999.99)).await.unwrap();

        let err = uow
            .insert_catalog_item(&CatalogItemDraft::new("Gold", dec!(100000000.00)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::OutOfRange(ref c) if c == "food_items.price"));
        assert_eq!(uow.list_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deleting_account_cascades() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let (user, item, order, status) = seed_order(&mut *uow).await;

        assert!(uow.delete_account(user.id).await.unwrap());
        assert!(uow.find_order(order.id).await.unwrap().is_none());
        assert!(uow.find_order_status(status.id).await.unwrap().is_none());
        // The catalog is untouched.
        assert!(uow.find_catalog_item(item.id).await.unwrap().is_some());
        assert!(!uow.delete_account(user.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_deleting_item_cascades() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let (user, item, order, status) = seed_order(&mut *uow).await;

        assert!(uow.delete_catalog_item(item.id).await.unwrap());
        assert!(uow.find_order(order.id).await.unwrap().is_none());
        assert!(uow.find_order_status(status.id).await.unwrap().is_none());
        assert!(uow.find_account(user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_name_lookup_prefers_lowest_id() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();

        let first = uow
            .insert_catalog_item(&CatalogItemDraft::new("Tea", dec!(1.00)))
            .await
            .unwrap();
        uow.insert_catalog_item(&CatalogItemDraft::new("Tea", dec!(2.00)))
            .await
            .unwrap();

        let found = uow.find_catalog_item_by_name("Tea").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert!(uow.find_catalog_item_by_name("tea").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_order_status_touches_only_status() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let (_, _, order, status) = seed_order(&mut *uow).await;

        let updated = uow
            .set_order_status(order.id, OrderStatus::Completed)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, status.id);
        assert_eq!(updated.status, OrderStatus::Completed);
        assert_eq!(updated.total_price, status.total_price);

        assert!(uow
            .set_order_status(order.id + 1, OrderStatus::Completed)
            .await
            .unwrap()
            .is_none());
    }
}
