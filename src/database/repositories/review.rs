//! Restaurant review repository

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::review::Review;
use crate::utils::errors::BaropotError;

const REVIEW_SELECT: &str = r#"
    SELECT r.id, r.restaurant_id, r.rating, r.content, r.user_id,
           u.name AS user_name, u.email AS user_email, r.created_at, r.updated_at
    FROM restaurant_reviews r
    JOIN users u ON u.id = r.user_id
"#;

#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a review and return its id
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        restaurant_id: i64,
        user_id: i64,
        rating: i32,
        content: &str,
    ) -> Result<i64, BaropotError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO restaurant_reviews (restaurant_id, user_id, rating, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id
            "#
        )
        .bind(restaurant_id)
        .bind(user_id)
        .bind(rating)
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(id)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Review>, BaropotError> {
        let review = sqlx::query_as::<_, Review>(&format!("{REVIEW_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(review)
    }

    /// Reviews of a restaurant, newest first
    pub async fn list_for_restaurant(&self, restaurant_id: i64) -> Result<Vec<Review>, BaropotError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "{REVIEW_SELECT} WHERE r.restaurant_id = $1 ORDER BY r.created_at DESC, r.id DESC"
        ))
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    /// Overwrite the fields that are present
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: i64,
        rating: Option<i32>,
        content: Option<&str>,
    ) -> Result<(), BaropotError> {
        sqlx::query(
            r#"
            UPDATE restaurant_reviews
            SET rating = COALESCE($2, rating),
                content = COALESCE($3, content),
                updated_at = $4
            WHERE id = $1
            "#
        )
        .bind(id)
        .bind(rating)
        .bind(content)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Delete a review, returning whether a row was removed
    pub async fn delete(&self, id: i64) -> Result<bool, BaropotError> {
        let result = sqlx::query("DELETE FROM restaurant_reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace the photo list
    pub async fn replace_photos(&self, conn: &mut PgConnection, id: i64, urls: &[String]) -> Result<(), BaropotError> {
        sqlx::query("DELETE FROM restaurant_review_photos WHERE review_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if !urls.is_empty() {
            sqlx::query("INSERT INTO restaurant_review_photos (review_id, url) SELECT $1, UNNEST($2::text[])")
                .bind(id)
                .bind(urls)
                .execute(&mut *conn)
                .await?;
        }

        Ok(())
    }

    /// Photo URLs grouped by review
    pub async fn photos_for(&self, ids: &[i64]) -> Result<HashMap<i64, Vec<String>>, BaropotError> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            "SELECT review_id, url FROM restaurant_review_photos WHERE review_id = ANY($1) ORDER BY id"
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<String>> = HashMap::new();
        for (review_id, url) in rows {
            grouped.entry(review_id).or_default().push(url);
        }
        Ok(grouped)
    }
}
