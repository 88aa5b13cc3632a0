use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::{auth::jwt::TokenError, users::StoreError};

/// Errors surfaced to HTTP clients.
///
/// Every variant except `Internal` carries a status, a machine-readable code
/// and a detail message. `Internal` is logged and answered with a bare 500.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("The particular user or id already exists")]
    UserIdExists,
    #[error("The user already exists")]
    UserAlreadyExists,
    #[error("Both the username and email can't be None at the same time")]
    MissingSelectors,
    #[error("the user with the given credentials do not exist")]
    UserNotFound,
    #[error("The provided jwt token has invalid signature")]
    InvalidSignature,
    #[error("The provided jwt token is invalid")]
    InvalidToken,
    #[error("The provided jwt token has expired")]
    TokenExpired,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'static str>,
    detail: &'a str,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> Option<&'static str> {
        match self {
            AppError::UserIdExists => Some("user_id_exists"),
            AppError::UserAlreadyExists => Some("user_already_exists"),
            AppError::MissingSelectors => Some("both_username_&_email_null"),
            AppError::UserNotFound => Some("user_not_found"),
            AppError::InvalidSignature => Some("invalid_signature"),
            AppError::InvalidToken => Some("invalid_token"),
            AppError::TokenExpired => Some("token_expired"),
            AppError::Internal(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Internal(e) = &self {
            error!(error = ?e, "internal error");
            let body = ErrorBody {
                error_code: None,
                detail: "Internal Server Error",
            };
            return (status, Json(body)).into_response();
        }

        let detail = self.to_string();
        let body = ErrorBody {
            error_code: self.code(),
            detail: &detail,
        };
        (status, Json(body)).into_response()
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::InvalidSignature => AppError::InvalidSignature,
            TokenError::InvalidToken => AppError::InvalidToken,
            TokenError::TokenExpired => AppError::TokenExpired,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateId => AppError::UserIdExists,
            StoreError::DuplicateEmail => AppError::UserAlreadyExists,
            StoreError::Other(e) => AppError::Internal(e),
        }
    }
}
