//! Tweets: short posts owned by a user.

use serde::{Deserialize, Serialize};

use super::user::UserId;

pub type TweetId = i64;

/// Maximum body length, in characters.
pub const MAX_TWEET_LEN: usize = 140;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: TweetId,
    pub body: String,
    pub author_id: UserId,
}

/// Ordering of tweet listings, by id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}
