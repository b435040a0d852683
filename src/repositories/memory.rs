//! In-memory store: one lock per logical table, held for the whole
//! check-then-act sequence of each mutation.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{CredentialStore, ProfileUpdate, StoreError, StoreResult, TokenLedger, TweetStore};
use crate::models::{Tweet, TweetId, User, UserId};

#[derive(Default)]
struct UserTable {
    by_id: HashMap<UserId, User>,
    id_by_email: HashMap<String, UserId>,
    last_id: UserId,
}

#[derive(Default)]
struct TweetTable {
    by_id: BTreeMap<TweetId, Tweet>,
    last_id: TweetId,
}

/// Process-local implementation of every storage port. Contents are lost on
/// restart.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<UserTable>,
    /// token -> revoked
    refresh_tokens: RwLock<HashMap<String, bool>>,
    tweets: RwLock<TweetTable>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn register(&self, email: &str, password_hash: String) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.id_by_email.contains_key(email) {
            return Err(StoreError::DuplicateEmail);
        }

        users.last_id += 1;
        let user = User {
            id: users.last_id,
            email: email.to_string(),
            password_hash,
            is_chirpy_red: false,
        };
        users.id_by_email.insert(user.email.clone(), user.id);
        users.by_id.insert(user.id, user.clone());
        debug!(user_id = user.id, "user stored");
        Ok(user)
    }

    async fn lookup_by_email(&self, email: &str) -> StoreResult<UserId> {
        let users = self.users.read().await;
        users
            .id_by_email
            .get(email)
            .copied()
            .ok_or(StoreError::NotFound)
    }

    async fn lookup_by_id(&self, id: UserId) -> StoreResult<User> {
        let users = self.users.read().await;
        users.by_id.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update_profile(&self, id: UserId, update: ProfileUpdate) -> StoreResult<User> {
        let mut users = self.users.write().await;
        let current_email = users
            .by_id
            .get(&id)
            .map(|u| u.email.clone())
            .ok_or(StoreError::NotFound)?;

        let new_email = update.email.filter(|e| *e != current_email);
        if let Some(email) = &new_email {
            if users.id_by_email.contains_key(email) {
                return Err(StoreError::DuplicateEmail);
            }
        }

        // All checks passed; from here on nothing can fail.
        if let Some(email) = &new_email {
            users.id_by_email.remove(&current_email);
            users.id_by_email.insert(email.clone(), id);
        }
        let user = users.by_id.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(email) = new_email {
            user.email = email;
        }
        if let Some(hash) = update.password_hash {
            user.password_hash = hash;
        }
        Ok(user.clone())
    }

    async fn set_membership(&self, id: UserId, is_member: bool) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let user = users.by_id.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.is_chirpy_red = is_member;
        Ok(())
    }
}

#[async_trait]
impl TokenLedger for InMemoryStore {
    async fn record(&self, token: &str) -> StoreResult<bool> {
        let mut tokens = self.refresh_tokens.write().await;
        if tokens.contains_key(token) {
            return Ok(false);
        }
        tokens.insert(token.to_string(), false);
        Ok(true)
    }

    async fn is_revoked(&self, token: &str) -> StoreResult<bool> {
        let tokens = self.refresh_tokens.read().await;
        Ok(tokens.get(token).copied().unwrap_or(true))
    }

    async fn revoke(&self, token: &str) -> StoreResult<bool> {
        let mut tokens = self.refresh_tokens.write().await;
        match tokens.get_mut(token) {
            Some(revoked) => {
                *revoked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl TweetStore for InMemoryStore {
    async fn create_tweet(&self, author_id: UserId, body: String) -> StoreResult<Tweet> {
        let mut tweets = self.tweets.write().await;
        tweets.last_id += 1;
        let tweet = Tweet {
            id: tweets.last_id,
            body,
            author_id,
        };
        tweets.by_id.insert(tweet.id, tweet.clone());
        Ok(tweet)
    }

    async fn get_tweet(&self, id: TweetId) -> StoreResult<Tweet> {
        let tweets = self.tweets.read().await;
        tweets.by_id.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list_tweets(&self, author_id: Option<UserId>) -> StoreResult<Vec<Tweet>> {
        let tweets = self.tweets.read().await;
        Ok(tweets
            .by_id
            .values()
            .filter(|t| author_id.map_or(true, |a| t.author_id == a))
            .cloned()
            .collect())
    }

    async fn delete_tweet(&self, id: TweetId, author_id: UserId) -> StoreResult<()> {
        let mut tweets = self.tweets.write().await;
        match tweets.by_id.get(&id) {
            None => Err(StoreError::NotFound),
            Some(t) if t.author_id != author_id => Err(StoreError::NotAuthor),
            Some(_) => {
                tweets.by_id.remove(&id);
                Ok(())
            }
        }
    }
}
