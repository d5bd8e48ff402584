use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::domain::account::AccountError;
use crate::domain::catalog::CatalogError;
use crate::domain::order::OrderError;
use crate::store::StoreError;

pub type AppResult<T> = Result<T, AppError>;

/// Coarse classification every failure is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    AuthFailure,
    MalformedPayload,
    Internal,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid path parameter: {0}")]
    InvalidPath(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Catalog(err) => match err {
                CatalogError::NotFound(_) => ErrorKind::NotFound,
                CatalogError::EmptyName
                | CatalogError::NameTooLong { .. }
                | CatalogError::CategoryTooLong { .. }
                | CatalogError::NonPositivePrice(_)
                | CatalogError::PriceOutOfRange(_) => ErrorKind::Validation,
            },
            AppError::Account(err) => match err {
                AccountError::NotFound(_) => ErrorKind::NotFound,
                AccountError::NameTaken(_) | AccountError::EmailTaken(_) => ErrorKind::Conflict,
                AccountError::InvalidCredentials => ErrorKind::AuthFailure,
                AccountError::Hashing(_) => ErrorKind::Internal,
                AccountError::EmptyUserName
                | AccountError::UserNameTooLong { .. }
                | AccountError::InvalidEmail(_)
                | AccountError::EmailTooLong { .. }
                | AccountError::EmptyPassword => ErrorKind::Validation,
            },
            AppError::Order(err) => match err {
                OrderError::NotFound(_)
                | OrderError::StatusNotFound(_)
                | OrderError::StatusRecordNotFound(_)
                | OrderError::ItemNotFound(_)
                | OrderError::AccountNotFound(_) => ErrorKind::NotFound,
                OrderError::InvalidQuantity(_)
                | OrderError::NonPositiveTotal(_)
                | OrderError::TotalOverflow
                | OrderError::TotalOutOfRange(_)
                | OrderError::UnknownStatus(_)
                | OrderError::TerminalStatus(_)
                | OrderError::InvalidStatusTransition { .. }
                | OrderError::AmbiguousItemRef => ErrorKind::Validation,
            },
            AppError::Store(err) => match err {
                StoreError::UniqueViolation(_) => ErrorKind::Conflict,
                StoreError::ForeignKeyViolation(_) => ErrorKind::NotFound,
                StoreError::CheckViolation(_) | StoreError::OutOfRange(_) => ErrorKind::Validation,
                StoreError::Database(_) | StoreError::Migration(_) => ErrorKind::Internal,
            },
            AppError::MalformedPayload(_) | AppError::InvalidPath(_) => ErrorKind::MalformedPayload,
        }
    }

    /// Message safe to hand to the client.
    fn public_message(&self) -> String {
        match (self.kind(), self) {
            (ErrorKind::Internal, _) => "Internal server error".to_string(),
            (_, AppError::Store(StoreError::UniqueViolation(_))) => {
                "Record already exists".to_string()
            }
            (_, AppError::Store(StoreError::ForeignKeyViolation(_))) => {
                "Referenced record not found".to_string()
            }
            (_, AppError::Store(StoreError::CheckViolation(constraint))) => {
                format!("Constraint violated: {constraint}")
            }
            (_, AppError::Store(StoreError::OutOfRange(_))) => "Numeric value out of range".to_string(),
            _ => self.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            // Duplicate registrations are reported as a plain bad request.
            ErrorKind::Conflict => StatusCode::BAD_REQUEST,
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::AuthFailure => StatusCode::UNAUTHORIZED,
            ErrorKind::MalformedPayload => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.kind() == ErrorKind::Internal {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, kind = ?self.kind(), "Request rejected");
        }

        HttpResponse::build(self.status_code()).json(json!({ "detail": self.public_message() }))
    }
}
