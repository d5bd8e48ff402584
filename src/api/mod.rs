// ============================================================================
// HTTP API - actix-web routes over the domain operations
// ============================================================================
//
// Each handler opens one unit of work, runs a single domain operation inside
// it and commits on success. Any `?` before the commit drops the unit of work
// and rolls everything back.
//
// ============================================================================

mod accounts;
mod catalog;
pub mod middleware;
mod orders;


use std::sync::Arc;

use actix_web::error::{JsonPayloadError, PathError};
use actix_web::{web, HttpRequest};

use crate::domain::account::AccountService;
use crate::domain::order::OrderCommandHandler;
use crate::error::AppError;
use crate::metrics::{self, Metrics};
use crate::store::Store;

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub accounts: AccountService,
    pub orders: OrderCommandHandler,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        accounts: AccountService,
        orders: OrderCommandHandler,
        metrics: Metrics,
    ) -> Self {
        Self {
            store,
            accounts,
            orders,
            metrics,
        }
    }
}

/// Register every route plus the JSON body and path error mappings.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .route("/health", web::get().to(metrics::health_handler))
        .route("/metrics", web::get().to(metrics::metrics_handler))
        // Accounts
        .route("/users", web::post().to(accounts::create_user))
        .route("/users/{id}", web::get().to(accounts::get_user))
        .route("/users/{id}", web::put().to(accounts::update_user))
        .route("/users/{id}", web::delete().to(accounts::delete_user))
        .route("/users/{id}/orders", web::get().to(orders::list_user_orders))
        .route("/login", web::post().to(accounts::login))
        // Catalog
        .route("/food_items", web::post().to(catalog::create_food_item))
        .route("/food_items", web::get().to(catalog::list_food_items))
        .route("/food_items/{id}", web::get().to(catalog::get_food_item))
        .route("/food_items/{id}", web::put().to(catalog::update_food_item))
        .route("/food_items/{id}", web::delete().to(catalog::delete_food_item))
        // Orders and status ledger
        .route("/orders", web::post().to(orders::place_order))
        .route("/orders", web::get().to(orders::list_orders))
        .route("/orders/{id}", web::get().to(orders::get_order))
        .route("/orders/{id}/status", web::get().to(orders::get_order_status))
        .route("/admin/orders/{id}/status", web::put().to(orders::update_order_status))
        .route("/order_status/{id}", web::get().to(orders::get_status_record));
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::MalformedPayload(err.to_string()).into()
}

fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::InvalidPath(err.to_string()).into()
}
