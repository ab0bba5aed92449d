//! Feed, comment and like models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FeedComment {
    pub id: i64,
    pub feed_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Feed post with its comments and like summary for the viewer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedView {
    #[serde(flatten)]
    pub feed: Feed,
    pub comments: Vec<FeedComment>,
    pub like_count: i64,
    pub is_liked: bool,
}

/// Body for creating or editing a post or a comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRequest {
    pub content: String,
}
