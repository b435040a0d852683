//! Authentication: password hashing, signed tokens, and the user/session
//! HTTP endpoints.

mod handlers;
pub mod jwt;
pub mod password;

pub use handlers::{create_user, login, refresh, revoke, update_user};
pub use jwt::{Claims, TokenError, TokenIssuer, TokenKind, VerifiedToken};
