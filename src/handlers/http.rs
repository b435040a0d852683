//! Shared application state and the health probe.

use std::sync::Arc;

use axum::{http::StatusCode, Json};
use serde_json::json;

use crate::config::Config;
use crate::repositories::InMemoryStore;
use crate::services::{SessionService, TweetService};

/// Shared application state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionService,
    pub tweets: TweetService,
    /// Expected `ApiKey` of the Polka webhook. Empty rejects every call.
    pub polka_key: String,
}

impl AppState {
    /// Wire every service to one fresh [`InMemoryStore`].
    pub fn in_memory(config: &Config) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            sessions: SessionService::from_config(config, store.clone(), store.clone()),
            tweets: TweetService::new(store),
            polka_key: config.polka_key.clone(),
        }
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }
    pub fn tweets(&self) -> &TweetService {
        &self.tweets
    }
}

/// GET /api/healthz — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "chirpy" })),
    )
}
