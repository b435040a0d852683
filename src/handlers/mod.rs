//! HTTP request handlers: tweets, webhooks and health.

pub mod http;
pub mod tweets;
pub mod webhooks;

pub use http::*;
pub use tweets::*;
pub use webhooks::*;
