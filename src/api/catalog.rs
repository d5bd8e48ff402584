use actix_web::{web, HttpResponse};

use crate::domain::catalog::{service, CatalogItemDraft};
use crate::error::AppResult;

use super::AppState;

pub async fn create_food_item(
    state: web::Data<AppState>,
    body: web::Json<CatalogItemDraft>,
) -> AppResult<HttpResponse> {
    let mut uow = state.store.begin().await?;
    let item = service::create_item(uow.as_mut(), body.into_inner()).await?;
    uow.commit().await?;

    Ok(HttpResponse::Created().json(item))
}

pub async fn list_food_items(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let mut uow = state.store.begin().await?;
    let items = service::list_items(uow.as_mut()).await?;

    Ok(HttpResponse::Ok().json(items))
}

pub async fn get_food_item(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let mut uow = state.store.begin().await?;
    let item = service::get_item(uow.as_mut(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(item))
}

pub async fn update_food_item(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<CatalogItemDraft>,
) -> AppResult<HttpResponse> {
    let mut uow = state.store.begin().await?;
    let item = service::update_item(uow.as_mut(), path.into_inner(), body.into_inner()).await?;
    uow.commit().await?;

    Ok(HttpResponse::Ok().json(item))
}

pub async fn delete_food_item(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let mut uow = state.store.begin().await?;
    service::delete_item(uow.as_mut(), path.into_inner()).await?;
    uow.commit().await?;

    Ok(HttpResponse::NoContent().finish())
}
