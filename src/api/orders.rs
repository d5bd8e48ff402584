use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::domain::order::{PlaceOrder, UpdateOrderStatus};
use crate::error::AppResult;

use super::AppState;

/// The item is named by `item_id` or by exact `food_name`, never both.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub user_id: i64,
    #[serde(default)]
    pub item_id: Option<i64>,
    #[serde(default)]
    pub food_name: Option<String>,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

pub async fn place_order(
    state: web::Data<AppState>,
    body: web::Json<PlaceOrderRequest>,
) -> AppResult<HttpResponse> {
    let PlaceOrderRequest {
        user_id,
        item_id,
        food_name,
        quantity,
    } = body.into_inner();
    let command = PlaceOrder::from_parts(user_id, item_id, food_name, quantity)?;

    let mut uow = state.store.begin().await?;
    let placed = state.orders.place_order(uow.as_mut(), command).await?;
    uow.commit().await?;

    state.metrics.record_order_placed();
    Ok(HttpResponse::Created().json(placed))
}

// Reads commit too: a drifted total is written back while reading.

pub async fn list_orders(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let mut uow = state.store.begin().await?;
    let orders = state.orders.list_orders(uow.as_mut()).await?;
    uow.commit().await?;

    Ok(HttpResponse::Ok().json(orders))
}

pub async fn get_order(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let mut uow = state.store.begin().await?;
    let order = state.orders.get_order(uow.as_mut(), path.into_inner()).await?;
    uow.commit().await?;

    Ok(HttpResponse::Ok().json(order))
}

pub async fn list_user_orders(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let mut uow = state.store.begin().await?;
    let orders = state
        .orders
        .list_orders_for_account(uow.as_mut(), path.into_inner())
        .await?;
    uow.commit().await?;

    Ok(HttpResponse::Ok().json(orders))
}

pub async fn update_order_status(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<StatusUpdateRequest>,
) -> AppResult<HttpResponse> {
    let command = UpdateOrderStatus::parse(path.into_inner(), &body.status)?;

    let mut uow = state.store.begin().await?;
    let record = state.orders.update_status(uow.as_mut(), command).await?;
    uow.commit().await?;

    state.metrics.record_status_update(record.status.as_str());
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Order {} status updated to {}", record.order_id, record.status),
    })))
}

pub async fn get_order_status(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let mut uow = state.store.begin().await?;
    let record = state
        .orders
        .get_status_for_order(uow.as_mut(), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(record))
}

pub async fn get_status_record(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let mut uow = state.store.begin().await?;
    let record = state
        .orders
        .get_status_record(uow.as_mut(), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(record))
}
