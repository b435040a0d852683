//! Storage ports: credentials, refresh-token ledger and tweets.
//!
//! Handlers and services only ever talk to these traits; [`InMemoryStore`]
//! is the adapter used by the server and the tests. A durable adapter must
//! keep the same three logical indices (id to user, email to id, token to
//! revoked flag) and their invariants.

mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Tweet, TweetId, User, UserId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("not found")]
    NotFound,

    #[error("caller is not the author")]
    NotAuthor,

    #[error("backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Changes applied by [`CredentialStore::update_profile`]. `None` leaves the
/// field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// User records with a unique email index.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a user under the next sequential id. Emails match exactly
    /// (case-sensitive).
    async fn register(&self, email: &str, password_hash: String) -> StoreResult<User>;

    async fn lookup_by_email(&self, email: &str) -> StoreResult<UserId>;

    async fn lookup_by_id(&self, id: UserId) -> StoreResult<User>;

    /// Apply `update` atomically. If the new email belongs to another user
    /// nothing is changed and [`StoreError::DuplicateEmail`] is returned.
    async fn update_profile(&self, id: UserId, update: ProfileUpdate) -> StoreResult<User>;

    async fn set_membership(&self, id: UserId, is_member: bool) -> StoreResult<()>;
}

/// Issued refresh tokens and their revocation flag, keyed by the full token
/// string.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Returns `false` without changing anything if the token is already known.
    async fn record(&self, token: &str) -> StoreResult<bool>;

    /// Unknown tokens count as revoked.
    async fn is_revoked(&self, token: &str) -> StoreResult<bool>;

    /// Returns `false` if the token is unknown. Revoking twice is a no-op
    /// that still returns `true`.
    async fn revoke(&self, token: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait TweetStore: Send + Sync {
    async fn create_tweet(&self, author_id: UserId, body: String) -> StoreResult<Tweet>;

    async fn get_tweet(&self, id: TweetId) -> StoreResult<Tweet>;

    /// All tweets, or only those of `author_id`, in ascending id order.
    async fn list_tweets(&self, author_id: Option<UserId>) -> StoreResult<Vec<Tweet>>;

    /// Remove a tweet if `author_id` wrote it.
    async fn delete_tweet(&self, id: TweetId, author_id: UserId) -> StoreResult<()>;
}
