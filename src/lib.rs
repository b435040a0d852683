//! Micro-blogging backend: user accounts, tweets, and sessions built on
//! short-lived access tokens plus revocable refresh tokens.

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use services::{SessionService, TweetService};

use axum::http::Method;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the `/api` router. Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let webhook_routes = axum::Router::new()
        .route("/polka/webhooks", post(handlers::polka_webhook))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_api_key,
        ));

    let api_routes = axum::Router::new()
        .route("/healthz", get(handlers::health))
        .route("/users", post(auth::create_user).put(auth::update_user))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/revoke", post(auth::revoke))
        .route(
            "/tweets",
            get(handlers::list_tweets).post(handlers::create_tweet),
        )
        .route(
            "/tweets/:tweet_id",
            get(handlers::get_tweet).delete(handlers::delete_tweet),
        )
        .merge(webhook_routes);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    axum::Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
