//! Auth extractors (Bearer tokens) and the API key middleware for webhooks.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tracing::debug;

use crate::error::{AppError, AuthFailure};
use crate::handlers::http::AppState;
use crate::models::UserId;

const API_KEY_PREFIX: &str = "ApiKey ";

/// Extractor: the raw token from `Authorization: Bearer <token>`, unchecked.
#[derive(Clone, Debug)]
pub struct BearerToken(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::from(AuthFailure::MissingToken))?;
        Ok(BearerToken(bearer.token().to_string()))
    }
}

/// Extractor: user ID from a valid access token.
#[derive(Clone, Copy, Debug)]
pub struct AuthUser(pub UserId);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let user_id = state.sessions().authenticate(&token)?;
        Ok(AuthUser(user_id))
    }
}

/// Middleware: require `Authorization: ApiKey <key>` matching the configured
/// Polka key.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix(API_KEY_PREFIX))
        .map(str::trim)
        .unwrap_or("");

    if key.is_empty() || key != state.polka_key {
        debug!("rejected request: invalid or missing api key");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
