use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::error::AppResult;
use crate::store::UnitOfWork;

use super::commands::{PlaceOrder, UpdateOrderStatus};
use super::errors::OrderError;
use super::model::{NewOrder, NewOrderStatus, Order, OrderStatusRecord, PlacedOrder};
use super::value_objects::{compute_total, ItemRef, OrderStatus};

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command → Catalog lookup → Order row → Status ledger row
//
// Every operation runs against the caller's unit of work, so the order and
// its status row become durable together or not at all.
//
// ============================================================================

/// Which status changes `update_status` accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Any status may follow any other.
    #[default]
    Unrestricted,
    /// pending → processing | cancelled, processing → completed | cancelled.
    Lifecycle,
}

#[derive(Debug, Clone, Default)]
pub struct OrderCommandHandler {
    policy: StatusPolicy,
}

impl OrderCommandHandler {
    pub fn new(policy: StatusPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> StatusPolicy {
        self.policy
    }

    /// Resolve the item at its current price, write the order and open its
    /// ledger entry as `pending` with the same total.
    pub async fn place_order(&self, uow: &mut dyn UnitOfWork, command: PlaceOrder) -> AppResult<PlacedOrder> {
        let PlaceOrder {
            user_id,
            item,
            quantity,
        } = command;

        if uow.find_account(user_id).await?.is_none() {
            return Err(OrderError::AccountNotFound(user_id).into());
        }

        let resolved = match &item {
            ItemRef::Id(id) => uow.find_catalog_item(*id).await?,
            ItemRef::Name(name) => uow.find_catalog_item_by_name(name).await?,
        };
        let catalog_item = resolved.ok_or(OrderError::ItemNotFound(item))?;

        let total_price = compute_total(catalog_item.price, quantity)?;

        let order = uow
            .insert_order(&NewOrder {
                user_id,
                item_id: catalog_item.id,
                quantity,
                food_name: catalog_item.food_name.clone(),
                total_price,
            })
            .await?;

        let status = uow
            .insert_order_status(&NewOrderStatus {
                order_id: order.id,
                status: OrderStatus::Pending,
                total_price,
            })
            .await?;

        tracing::info!(
            order_id = order.id,
            user_id = user_id,
            item_id = catalog_item.id,
            quantity = quantity,
            total_price = %total_price,
            "Placed order"
        );

        Ok(PlacedOrder { order, status })
    }

    /// Reads the order and rewrites its stored total from the live price.
    pub async fn get_order(&self, uow: &mut dyn UnitOfWork, order_id: i64) -> AppResult<Order> {
        let order = uow
            .find_order(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        let mut prices = HashMap::new();
        self.refresh_total(uow, order, &mut prices).await
    }

    pub async fn list_orders(&self, uow: &mut dyn UnitOfWork) -> AppResult<Vec<Order>> {
        let orders = uow.list_orders().await?;
        self.refresh_totals(uow, orders).await
    }

    pub async fn list_orders_for_account(
        &self,
        uow: &mut dyn UnitOfWork,
        user_id: i64,
    ) -> AppResult<Vec<Order>> {
        if uow.find_account(user_id).await?.is_none() {
            return Err(OrderError::AccountNotFound(user_id).into());
        }

        let orders = uow.list_orders_for_account(user_id).await?;
        self.refresh_totals(uow, orders).await
    }

    pub async fn update_status(
        &self,
        uow: &mut dyn UnitOfWork,
        command: UpdateOrderStatus,
    ) -> AppResult<OrderStatusRecord> {
        let UpdateOrderStatus { order_id, status } = command;

        if uow.find_order(order_id).await?.is_none() {
            return Err(OrderError::NotFound(order_id).into());
        }

        if self.policy == StatusPolicy::Lifecycle {
            let current = uow
                .find_order_status_by_order(order_id)
                .await?
                .ok_or(OrderError::StatusNotFound(order_id))?;

            if current.status.is_terminal() {
                return Err(OrderError::TerminalStatus(current.status).into());
            }
            if !current.status.can_transition_to(status) {
                return Err(OrderError::InvalidStatusTransition {
                    from: current.status,
                    to: status,
                }
                .into());
            }
        }

        let record = uow
            .set_order_status(order_id, status)
            .await?
            .ok_or(OrderError::StatusNotFound(order_id))?;

        tracing::info!(order_id = order_id, status = %status, "Updated order status");
        Ok(record)
    }

    pub async fn get_status_for_order(
        &self,
        uow: &mut dyn UnitOfWork,
        order_id: i64,
    ) -> AppResult<OrderStatusRecord> {
        if uow.find_order(order_id).await?.is_none() {
            return Err(OrderError::NotFound(order_id).into());
        }

        let record = uow
            .find_order_status_by_order(order_id)
            .await?
            .ok_or(OrderError::StatusNotFound(order_id))?;
        Ok(record)
    }

    pub async fn get_status_record(
        &self,
        uow: &mut dyn UnitOfWork,
        status_id: i64,
    ) -> AppResult<OrderStatusRecord> {
        let record = uow
            .find_order_status(status_id)
            .await?
            .ok_or(OrderError::StatusRecordNotFound(status_id))?;
        Ok(record)
    }

    async fn refresh_totals(&self, uow: &mut dyn UnitOfWork, orders: Vec<Order>) -> AppResult<Vec<Order>> {
        let mut prices = HashMap::new();
        let mut refreshed = Vec::with_capacity(orders.len());

        for order in orders {
            refreshed.push(self.refresh_total(uow, order, &mut prices).await?);
        }

        Ok(refreshed)
    }

    /// Recompute `unit price × quantity` and persist it when it drifted.
    async fn refresh_total(
        &self,
        uow: &mut dyn UnitOfWork,
        mut order: Order,
        prices: &mut HashMap<i64, Option<Decimal>>,
    ) -> AppResult<Order> {
        let unit_price = match prices.get(&order.item_id) {
            Some(price) => *price,
            None => {
                let price = uow.find_catalog_item(order.item_id).await?.map(|item| item.price);
                prices.insert(order.item_id, price);
                price
            }
        };

        let Some(unit_price) = unit_price else {
            tracing::warn!(order_id = order.id, item_id = order.item_id, "Order references a missing food item");
            return Ok(order);
        };

        let total_price = match compute_total(unit_price, order.quantity) {
            Ok(total) => total,
            Err(err @ (OrderError::TotalOutOfRange(_) | OrderError::TotalOverflow)) => {
                tracing::warn!(order_id = order.id, error = %err, "Keeping stored total");
                return Ok(order);
            }
            Err(err) => return Err(err.into()),
        };
        if total_price != order.total_price {
            tracing::debug!(
                order_id = order.id,
                old_total = %order.total_price,
                new_total = %total_price,
                "Refreshing stale order total"
            );
            uow.set_order_total(order.id, total_price).await?;
            order.total_price = total_price;
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{AccountDraft, AccountService};
    use crate::domain::account::password::test_hasher;
    use crate::domain::catalog::{service as catalog, CatalogItemDraft};
    use crate::error::{AppError, ErrorKind};
    use crate::store::{MemoryStore, Store};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    struct Fixture {
        store: MemoryStore,
        user_id: i64,
        item_id: i64,
    }

    /// One user and a 5.00 "Burger", committed.
    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();

        let account = AccountService::new(Arc::new(test_hasher()))
            .register(
                uow.as_mut(),
                AccountDraft {
                    user_name: "jane".into(),
                    email: "jane@example.com".into(),
                    password: "pw".into(),
                },
            )
            .await
            .unwrap();
        let item = catalog::create_item(uow.as_mut(), CatalogItemDraft::new("Burger", dec!(5.00)))
            .await
            .unwrap();
        uow.commit().await.unwrap();

        Fixture {
            store,
            user_id: account.id,
            item_id: item.id,
        }
    }

    fn by_id(user_id: i64, item_id: i64, quantity: i32) -> PlaceOrder {
        PlaceOrder {
            user_id,
            item: ItemRef::Id(item_id),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_place_order_computes_total_and_pending_status() {
        let fx = fixture().await;
        let handler = OrderCommandHandler::default();
        let mut uow = fx.store.begin().await.unwrap();

        let placed = handler
            .place_order(uow.as_mut(), by_id(fx.user_id, fx.item_id, 3))
            .await
            .unwrap();

        assert_eq!(placed.order.total_price, dec!(15.00));
        assert_eq!(placed.order.food_name, "Burger");
        assert_eq!(placed.status.order_id, placed.order.id);
        assert_eq!(placed.status.status, OrderStatus::Pending);
        assert_eq!(placed.status.total_price, dec!(15.00));
    }

    #[tokio::test]
    async fn test_place_order_by_exact_name() {
        let fx = fixture().await;
        let handler = OrderCommandHandler::default();
        let mut uow = fx.store.begin().await.unwrap();

        let placed = handler
            .place_order(
                uow.as_mut(),
                PlaceOrder {
                    user_id: fx.user_id,
                    item: ItemRef::Name("Burger".into()),
                    quantity: 2,
                },
            )
            .await
            .unwrap();
        assert_eq!(placed.order.item_id, fx.item_id);
        assert_eq!(placed.order.total_price, dec!(10.00));

        let err = handler
            .place_order(
                uow.as_mut(),
                PlaceOrder {
                    user_id: fx.user_id,
                    item: ItemRef::Name("burger".into()),
                    quantity: 2,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Order(OrderError::ItemNotFound(ItemRef::Name(_)))));
    }

    #[tokio::test]
    async fn test_unknown_item_persists_nothing() {
        let fx = fixture().await;
        let handler = OrderCommandHandler::default();

        let mut uow = fx.store.begin().await.unwrap();
        let err = handler
            .place_order(uow.as_mut(), by_id(fx.user_id, 999, 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        drop(uow);

        let mut uow = fx.store.begin().await.unwrap();
        assert!(uow.list_orders().await.unwrap().is_empty());
        assert!(uow.find_order_status(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_account_is_not_found() {
        let fx = fixture().await;
        let handler = OrderCommandHandler::default();
        let mut uow = fx.store.begin().await.unwrap();

        let err = handler
            .place_order(uow.as_mut(), by_id(fx.user_id + 100, fx.item_id, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Order(OrderError::AccountNotFound(_))));
        assert!(uow.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_recomputes_and_persists_total() {
        let fx = fixture().await;
        let handler = OrderCommandHandler::default();

        let mut uow = fx.store.begin().await.unwrap();
        let placed = handler
            .place_order(uow.as_mut(), by_id(fx.user_id, fx.item_id, 3))
            .await
            .unwrap();
        catalog::update_item(uow.as_mut(), fx.item_id, CatalogItemDraft::new("Burger", dec!(6.00)))
            .await
            .unwrap();
        uow.commit().await.unwrap();

        // Stored value is still the creation-time total until someone reads it.
        let mut uow = fx.store.begin().await.unwrap();
        let raw = uow.find_order(placed.order.id).await.unwrap().unwrap();
        assert_eq!(raw.total_price, dec!(15.00));

        let order = handler.get_order(uow.as_mut(), placed.order.id).await.unwrap();
        assert_eq!(order.total_price, dec!(18.00));
        uow.commit().await.unwrap();

        let mut uow = fx.store.begin().await.unwrap();
        let raw = uow.find_order(placed.order.id).await.unwrap().unwrap();
        assert_eq!(raw.total_price, dec!(18.00));

        // The ledger keeps its own total.
        let status = uow.find_order_status_by_order(placed.order.id).await.unwrap().unwrap();
        assert_eq!(status.total_price, dec!(15.00));
    }

    #[tokio::test]
    async fn test_total_beyond_column_persists_nothing() {
        let fx = fixture().await;
        let handler = OrderCommandHandler::default();

        let mut uow = fx.store.begin().await.unwrap();
        let err = handler
            .place_order(uow.as_mut(), by_id(fx.user_id, fx.item_id, 20_000_000))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Order(OrderError::TotalOutOfRange(_))));
        assert_eq!(err.kind(), ErrorKind::Validation);
        drop(uow);

        let mut uow = fx.store.begin().await.unwrap();
        assert!(uow.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_keeps_stored_total_when_recompute_overflows_column() {
        let fx = fixture().await;
        let handler = OrderCommandHandler::default();

        let mut uow = fx.store.begin().await.unwrap();
        let placed = handler
            .place_order(uow.as_mut(), by_id(fx.user_id, fx.item_id, 1_000_000))
            .await
            .unwrap();
        assert_eq!(placed.order.total_price, dec!(5000000.00));
        catalog::update_item(uow.as_mut(), fx.item_id, CatalogItemDraft::new("Burger", dec!(500.00)))
            .await
            .unwrap();
        uow.commit().await.unwrap();

        let mut uow = fx.store.begin().await.unwrap();
        let order = handler.get_order(uow.as_mut(), placed.order.id).await.unwrap();
        assert_eq!(order.total_price, dec!(5000000.00));
        let listed = handler.list_orders(uow.as_mut()).await.unwrap();
        assert_eq!(listed[0].total_price, dec!(5000000.00));
        uow.commit().await.unwrap();

        let mut uow = fx.store.begin().await.unwrap();
        let raw = uow.find_order(placed.order.id).await.unwrap().unwrap();
        assert_eq!(raw.total_price, dec!(5000000.00));
    }

    #[tokio::test]
    async fn test_list_recomputes_every_order() {
        let fx = fixture().await;
        let handler = OrderCommandHandler::default();
        let mut uow = fx.store.begin().await.unwrap();

        handler
            .place_order(uow.as_mut(), by_id(fx.user_id, fx.item_id, 1))
            .await
            .unwrap();
        handler
            .place_order(uow.as_mut(), by_id(fx.user_id, fx.item_id, 2))
            .await
            .unwrap();
        catalog::update_item(uow.as_mut(), fx.item_id, CatalogItemDraft::new("Burger", dec!(4.00)))
            .await
            .unwrap();

        let totals: Vec<Decimal> = handler
            .list_orders(uow.as_mut())
            .await
            .unwrap()
            .into_iter()
            .map(|order| order.total_price)
            .collect();
        assert_eq!(totals, vec![dec!(4.00), dec!(8.00)]);

        let mine = handler
            .list_orders_for_account(uow.as_mut(), fx.user_id)
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);

        let err = handler
            .list_orders_for_account(uow.as_mut(), fx.user_id + 1)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_get_missing_order() {
        let fx = fixture().await;
        let handler = OrderCommandHandler::default();
        let mut uow = fx.store.begin().await.unwrap();

        let err = handler.get_order(uow.as_mut(), 404).await.unwrap_err();
        assert!(matches!(err, AppError::Order(OrderError::NotFound(404))));
    }

    #[tokio::test]
    async fn test_unrestricted_status_updates() {
        let fx = fixture().await;
        let handler = OrderCommandHandler::default();
        let mut uow = fx.store.begin().await.unwrap();

        let placed = handler
            .place_order(uow.as_mut(), by_id(fx.user_id, fx.item_id, 1))
            .await
            .unwrap();

        for next in [OrderStatus::Completed, OrderStatus::Pending, OrderStatus::Cancelled] {
            let record = handler
                .update_status(
                    uow.as_mut(),
                    UpdateOrderStatus {
                        order_id: placed.order.id,
                        status: next,
                    },
                )
                .await
                .unwrap();
            assert_eq!(record.status, next);
        }

        let current = handler
            .get_status_for_order(uow.as_mut(), placed.order.id)
            .await
            .unwrap();
        assert_eq!(current.status, OrderStatus::Cancelled);

        let by_record = handler
            .get_status_record(uow.as_mut(), current.id)
            .await
            .unwrap();
        assert_eq!(by_record, current);
    }

    #[tokio::test]
    async fn test_status_update_for_missing_order() {
        let fx = fixture().await;
        let handler = OrderCommandHandler::default();
        let mut uow = fx.store.begin().await.unwrap();

        let err = handler
            .update_status(
                uow.as_mut(),
                UpdateOrderStatus {
                    order_id: 77,
                    status: OrderStatus::Processing,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Order(OrderError::NotFound(77))));

        let err = handler.get_status_for_order(uow.as_mut(), 77).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = handler.get_status_record(uow.as_mut(), 77).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_lifecycle_policy_rejects_invalid_transitions() {
        let fx = fixture().await;
        let handler = OrderCommandHandler::new(StatusPolicy::Lifecycle);
        let mut uow = fx.store.begin().await.unwrap();

        let placed = handler
            .place_order(uow.as_mut(), by_id(fx.user_id, fx.item_id, 1))
            .await
            .unwrap();
        let order_id = placed.order.id;
        let update = |status| UpdateOrderStatus { order_id, status };

        let err = handler
            .update_status(uow.as_mut(), update(OrderStatus::Completed))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Order(OrderError::InvalidStatusTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Completed
            })
        ));

        handler
            .update_status(uow.as_mut(), update(OrderStatus::Processing))
            .await
            .unwrap();
        handler
            .update_status(uow.as_mut(), update(OrderStatus::Completed))
            .await
            .unwrap();

        let err = handler
            .update_status(uow.as_mut(), update(OrderStatus::Pending))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Order(OrderError::TerminalStatus(OrderStatus::Completed))
        ));

        let current = handler.get_status_for_order(uow.as_mut(), order_id).await.unwrap();
        assert_eq!(current.status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_deleting_item_cascades_to_orders() {
        let fx = fixture().await;
        let handler = OrderCommandHandler::default();
        let mut uow = fx.store.begin().await.unwrap();

        let placed = handler
            .place_order(uow.as_mut(), by_id(fx.user_id, fx.item_id, 2))
            .await
            .unwrap();
        catalog::delete_item(uow.as_mut(), fx.item_id).await.unwrap();

        let err = handler.get_order(uow.as_mut(), placed.order.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(uow.find_order_status(placed.status.id).await.unwrap().is_none());
    }
}
