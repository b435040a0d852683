//! User accounts.

use std::fmt;

use serde::Serialize;

/// Sequential user identifier, starting at 1.
pub type UserId = i64;

/// A registered account.
///
/// `password_hash` is an argon2 PHC string; it is opaque to everything but
/// [`crate::auth::password`].
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub is_chirpy_red: bool,
}

// Keep the hash out of logs.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("is_chirpy_red", &self.is_chirpy_red)
            .finish()
    }
}

/// Public view of a user, as returned by the HTTP API.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: UserId,
    pub email: String,
    pub is_chirpy_red: bool,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password_hash() {
        let user = User {
            id: 1,
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            is_chirpy_red: false,
        };
        let printed = format!("{:?}", user);
        assert!(printed.contains("a@x.com"));
        assert!(!printed.contains("secret"));
    }
}
