//! Application error types and the mapping from internal failure causes
//! to the small set of outcomes callers are allowed to see.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::auth::TokenError;
use crate::repositories::StoreError;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Not found")]
    NotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::DuplicateEmail => (StatusCode::CONFLICT, self.to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Why an authentication attempt was refused.
///
/// These causes are logged but never shown to the caller: login failures
/// collapse to [`AppError::InvalidCredentials`] and token failures to
/// [`AppError::Unauthorized`].
#[derive(Error, Debug)]
pub enum AuthFailure {
    #[error("missing or malformed Authorization header")]
    MissingToken,

    #[error("{0}")]
    Token(#[from] TokenError),

    #[error("expected issuer {expected}, token carries {found}")]
    WrongIssuer {
        expected: &'static str,
        found: String,
    },

    #[error("refresh token revoked or never issued")]
    RefreshRevoked,

    #[error("no user with this email")]
    UnknownEmail,

    #[error("password mismatch")]
    WrongPassword,
}

impl From<AuthFailure> for AppError {
    fn from(failure: AuthFailure) -> Self {
        debug!(reason = %failure, "authentication refused");
        match failure {
            AuthFailure::UnknownEmail | AuthFailure::WrongPassword => AppError::InvalidCredentials,
            AuthFailure::MissingToken
            | AuthFailure::Token(_)
            | AuthFailure::WrongIssuer { .. }
            | AuthFailure::RefreshRevoked => AppError::Unauthorized,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AppError::DuplicateEmail,
            StoreError::NotFound => AppError::NotFound,
            StoreError::NotAuthor => AppError::Forbidden,
            StoreError::Backend(msg) => AppError::Internal(anyhow::anyhow!("store: {}", msg)),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(e) => AppError::Internal(anyhow::anyhow!("sign token: {}", e)),
            e @ TokenError::ExpiryOutOfRange(_) => AppError::Internal(e.into()),
            other => AuthFailure::Token(other).into(),
        }
    }
}
