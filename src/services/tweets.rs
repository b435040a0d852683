//! Posting, reading and deleting tweets.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{SortOrder, Tweet, TweetId, UserId, MAX_TWEET_LEN};
use crate::repositories::TweetStore;

const BANNED_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const MASK: &str = "****";

#[derive(Clone)]
pub struct TweetService {
    store: Arc<dyn TweetStore>,
}

impl TweetService {
    pub fn new(store: Arc<dyn TweetStore>) -> Self {
        Self { store }
    }

    pub async fn post(&self, author_id: UserId, body: &str) -> AppResult<Tweet> {
        if body.chars().count() > MAX_TWEET_LEN {
            return Err(AppError::Validation(format!(
                "Tweet is longer than {} characters",
                MAX_TWEET_LEN
            )));
        }
        let tweet = self.store.create_tweet(author_id, censor(body)).await?;
        info!(tweet_id = tweet.id, author_id, "tweet posted");
        Ok(tweet)
    }

    pub async fn get(&self, id: TweetId) -> AppResult<Tweet> {
        Ok(self.store.get_tweet(id).await?)
    }

    pub async fn list(&self, author_id: Option<UserId>, order: SortOrder) -> AppResult<Vec<Tweet>> {
        let mut tweets = self.store.list_tweets(author_id).await?;
        match order {
            SortOrder::Asc => tweets.sort_by_key(|t| t.id),
            SortOrder::Desc => tweets.sort_by_key(|t| std::cmp::Reverse(t.id)),
        }
        Ok(tweets)
    }

    pub async fn delete(&self, id: TweetId, author_id: UserId) -> AppResult<()> {
        self.store.delete_tweet(id, author_id).await?;
        info!(tweet_id = id, author_id, "tweet deleted");
        Ok(())
    }
}

/// Mask banned words, matched whole and case-insensitively.
pub fn censor(body: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(&format!(r"(?i)\b({})\b", BANNED_WORDS.join("|")))
            .expect("banned word pattern is a valid regex")
    });
    pattern.replace_all(body, MASK).into_owned()
}
