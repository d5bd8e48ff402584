use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::domain::account::{AccountDraft, AccountError, Credentials};
use crate::error::{AppError, AppResult};

use super::AppState;

pub async fn create_user(state: web::Data<AppState>, body: web::Json<AccountDraft>) -> AppResult<HttpResponse> {
    let mut uow = state.store.begin().await?;
    let account = state.accounts.register(uow.as_mut(), body.into_inner()).await?;
    uow.commit().await?;

    Ok(HttpResponse::Created().json(account))
}

pub async fn get_user(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let mut uow = state.store.begin().await?;
    let account = state.accounts.get(uow.as_mut(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(account))
}

pub async fn update_user(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<AccountDraft>,
) -> AppResult<HttpResponse> {
    let mut uow = state.store.begin().await?;
    let account = state
        .accounts
        .update(uow.as_mut(), path.into_inner(), body.into_inner())
        .await?;
    uow.commit().await?;

    Ok(HttpResponse::Ok().json(account))
}

pub async fn delete_user(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let mut uow = state.store.begin().await?;
    state.accounts.delete(uow.as_mut(), path.into_inner()).await?;
    uow.commit().await?;

    Ok(HttpResponse::NoContent().finish())
}

pub async fn login(state: web::Data<AppState>, body: web::Json<Credentials>) -> AppResult<HttpResponse> {
    let mut uow = state.store.begin().await?;
    let account = match state.accounts.authenticate(uow.as_mut(), body.into_inner()).await {
        Ok(account) => account,
        Err(err) => {
            if matches!(err, AppError::Account(AccountError::InvalidCredentials)) {
                state.metrics.record_auth_failure();
            }
            return Err(err);
        }
    };

    Ok(HttpResponse::Ok().json(json!({
        "message": "Login successful",
        "user_id": account.id,
        "user_name": account.user_name,
    })))
}
