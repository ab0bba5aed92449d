//! Feed repository: posts, comments and likes

use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use chrono::Utc;
use crate::models::feed::{Feed, FeedComment};
use crate::utils::errors::BaropotError;

const FEED_SELECT: &str = r#"
    SELECT f.id, f.user_id, u.name AS user_name, f.content, f.created_at, f.updated_at
    FROM feeds f
    JOIN users u ON u.id = f.user_id
"#;

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.feed_id, c.user_id, u.name AS user_name, c.content, c.created_at, c.updated_at
    FROM feed_comments c
    JOIN users u ON u.id = c.user_id
"#;

#[derive(Clone)]
pub struct FeedRepository {
    pool: PgPool,
}

impl FeedRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a post and return its id
    pub async fn create(&self, user_id: i64, content: &str) -> Result<i64, BaropotError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO feeds (user_id, content, created_at, updated_at) VALUES ($1, $2, $3, $3) RETURNING id"
        )
        .bind(user_id)
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Feed>, BaropotError> {
        let feed = sqlx::query_as::<_, Feed>(&format!("{FEED_SELECT} WHERE f.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(feed)
    }

    pub async fn exists(&self, id: i64) -> Result<bool, BaropotError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM feeds WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// All posts, newest first
    pub async fn list(&self) -> Result<Vec<Feed>, BaropotError> {
        let feeds = sqlx::query_as::<_, Feed>(&format!("{FEED_SELECT} ORDER BY f.created_at DESC, f.id DESC"))
            .fetch_all(&self.pool)
            .await?;

        Ok(feeds)
    }

    pub async fn update(&self, id: i64, content: &str) -> Result<(), BaropotError> {
        sqlx::query("UPDATE feeds SET content = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(content)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete a post; comments and likes go with it
    pub async fn delete(&self, id: i64) -> Result<bool, BaropotError> {
        let result = sqlx::query("DELETE FROM feeds WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert a comment and return its id
    pub async fn create_comment(&self, feed_id: i64, user_id: i64, content: &str) -> Result<i64, BaropotError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO feed_comments (feed_id, user_id, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id
            "#
        )
        .bind(feed_id)
        .bind(user_id)
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn find_comment(&self, id: i64) -> Result<Option<FeedComment>, BaropotError> {
        let comment = sqlx::query_as::<_, FeedComment>(&format!("{COMMENT_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(comment)
    }

    pub async fn update_comment(&self, id: i64, content: &str) -> Result<(), BaropotError> {
        sqlx::query("UPDATE feed_comments SET content = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(content)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete_comment(&self, id: i64) -> Result<bool, BaropotError> {
        let result = sqlx::query("DELETE FROM feed_comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Comments grouped by post, oldest first within a post
    pub async fn comments_for(&self, ids: &[i64]) -> Result<HashMap<i64, Vec<FeedComment>>, BaropotError> {
        let comments = sqlx::query_as::<_, FeedComment>(&format!(
            "{COMMENT_SELECT} WHERE c.feed_id = ANY($1) ORDER BY c.created_at, c.id"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<FeedComment>> = HashMap::new();
        for comment in comments {
            grouped.entry(comment.feed_id).or_default().push(comment);
        }
        Ok(grouped)
    }

    /// Like a post; `false` when the user already liked it
    pub async fn insert_like(&self, feed_id: i64, user_id: i64) -> Result<bool, BaropotError> {
        let result = sqlx::query(
            "INSERT INTO feed_likes (feed_id, user_id) VALUES ($1, $2) ON CONFLICT (user_id, feed_id) DO NOTHING"
        )
        .bind(feed_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_like(&self, feed_id: i64, user_id: i64) -> Result<bool, BaropotError> {
        let result = sqlx::query("DELETE FROM feed_likes WHERE feed_id = $1 AND user_id = $2")
            .bind(feed_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Like counts per post
    pub async fn like_counts(&self, ids: &[i64]) -> Result<HashMap<i64, i64>, BaropotError> {
        let rows = sqlx::query_as::<_, (i64, i64)>(
            "SELECT feed_id, COUNT(*) FROM feed_likes WHERE feed_id = ANY($1) GROUP BY feed_id"
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// Subset of `ids` the user has liked
    pub async fn liked_by(&self, user_id: i64, ids: &[i64]) -> Result<HashSet<i64>, BaropotError> {
        let rows: Vec<i64> = sqlx::query_scalar(
            "SELECT feed_id FROM feed_likes WHERE user_id = $1 AND feed_id = ANY($2)"
        )
        .bind(user_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
