//! Payment provider (Polka) webhook.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::handlers::http::AppState;
use crate::models::UserId;

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Debug, Deserialize)]
pub struct PolkaWebhook {
    pub event: String,
    #[serde(default)]
    pub data: PolkaData,
}

#[derive(Debug, Default, Deserialize)]
pub struct PolkaData {
    pub user_id: Option<UserId>,
}

/// POST /api/polka/webhooks — guarded by [`crate::middleware::require_api_key`].
pub async fn polka_webhook(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<PolkaWebhook>,
) -> Result<StatusCode, AppError> {
    if body.event != USER_UPGRADED {
        debug!(event = %body.event, "ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    }
    let user_id = body
        .data
        .user_id
        .ok_or_else(|| AppError::Validation("data.user_id is required".to_string()))?;
    state.sessions().upgrade_membership(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
