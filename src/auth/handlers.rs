//! User and session HTTP handlers: register, update, login, refresh, revoke.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::extractors::{JsonBody, ValidatedJson};
use crate::handlers::http::AppState;
use crate::middleware::BearerToken;
use crate::models::UserInfo;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserInfo,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserInfo>), AppError> {
    let user = state.sessions().register(&body.email, &body.password).await?;
    Ok((StatusCode::CREATED, Json(UserInfo::from(&user))))
}

/// PUT /api/users — requires an access token.
pub async fn update_user(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    ValidatedJson(body): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserInfo>, AppError> {
    let user = state
        .sessions()
        .update_profile(&token, body.email, body.password)
        .await?;
    Ok(Json(UserInfo::from(&user)))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let session = state.sessions().login(&body.email, &body.password).await?;
    Ok(Json(LoginResponse {
        user: UserInfo::from(&session.user),
        token: session.access_token,
        refresh_token: session.refresh_token,
    }))
}

/// POST /api/refresh — requires a refresh token.
pub async fn refresh(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<RefreshResponse>, AppError> {
    let token = state.sessions().refresh(&token).await?;
    Ok(Json(RefreshResponse { token }))
}

/// POST /api/revoke — requires a refresh token.
pub async fn revoke(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<StatusCode, AppError> {
    state.sessions().revoke(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}
