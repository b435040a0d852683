//! Middleware and extractors for authenticated routes.

pub mod auth;

pub use auth::{require_api_key, AuthUser, BearerToken};
