//! Restaurant bookmark repository

use sqlx::PgPool;
use crate::models::restaurant::{Bookmark, Restaurant};
use crate::utils::errors::BaropotError;

#[derive(Clone)]
pub struct BookmarkRepository {
    pool: PgPool,
}

impl BookmarkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a bookmark; `None` when the pair already exists
    pub async fn insert(&self, user_id: i64, restaurant_id: i64) -> Result<Option<Bookmark>, BaropotError> {
        let bookmark = sqlx::query_as::<_, Bookmark>(
            r#"
            INSERT INTO restaurant_bookmarks (user_id, restaurant_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, restaurant_id) DO NOTHING
            RETURNING id, user_id, restaurant_id, created_at
            "#
        )
        .bind(user_id)
        .bind(restaurant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(bookmark)
    }

    /// Delete a bookmark, returning whether a row was removed
    pub async fn delete(&self, user_id: i64, restaurant_id: i64) -> Result<bool, BaropotError> {
        let result = sqlx::query("DELETE FROM restaurant_bookmarks WHERE user_id = $1 AND restaurant_id = $2")
            .bind(user_id)
            .bind(restaurant_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Restaurants bookmarked by the user, newest bookmark first
    pub async fn restaurants_for_user(&self, user_id: i64) -> Result<Vec<Restaurant>, BaropotError> {
        let restaurants = sqlx::query_as::<_, Restaurant>(
            r#"
            SELECT r.id, r.owner_id, r.name, r.category, r.address, r.lat, r.lng, r.description, r.phone_number,
                   r.opening_time, r.closing_time, r.last_order_time, r.created_at, r.updated_at
            FROM restaurants r
            JOIN restaurant_bookmarks b ON b.restaurant_id = r.id
            WHERE b.user_id = $1
            ORDER BY b.created_at DESC
            "#
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(restaurants)
    }
}
