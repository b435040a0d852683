//! Tweet HTTP handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::extractors::{JsonBody, QueryParams};
use crate::handlers::http::AppState;
use crate::middleware::AuthUser;
use crate::models::{SortOrder, Tweet, TweetId, UserId};

#[derive(Debug, Deserialize)]
pub struct CreateTweetRequest {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ListTweetsQuery {
    pub author_id: Option<UserId>,
    #[serde(default)]
    pub sort: SortOrder,
}

/// POST /api/tweets
pub async fn create_tweet(
    State(state): State<AppState>,
    AuthUser(author_id): AuthUser,
    JsonBody(body): JsonBody<CreateTweetRequest>,
) -> Result<(StatusCode, Json<Tweet>), AppError> {
    let tweet = state.tweets().post(author_id, &body.body).await?;
    Ok((StatusCode::CREATED, Json(tweet)))
}

/// GET /api/tweets?author_id=&sort=asc|desc
pub async fn list_tweets(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListTweetsQuery>,
) -> Result<Json<Vec<Tweet>>, AppError> {
    let tweets = state.tweets().list(query.author_id, query.sort).await?;
    Ok(Json(tweets))
}

/// GET /api/tweets/:tweet_id
pub async fn get_tweet(
    State(state): State<AppState>,
    Path(tweet_id): Path<TweetId>,
) -> Result<Json<Tweet>, AppError> {
    Ok(Json(state.tweets().get(tweet_id).await?))
}

/// DELETE /api/tweets/:tweet_id — only the author may delete.
pub async fn delete_tweet(
    State(state): State<AppState>,
    AuthUser(author_id): AuthUser,
    Path(tweet_id): Path<TweetId>,
) -> Result<StatusCode, AppError> {
    state.tweets().delete(tweet_id, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
