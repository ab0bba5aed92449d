//! Restaurant repository implementation

use std::collections::{HashMap, HashSet};

use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use chrono::Utc;
use crate::models::restaurant::{FindRestaurantsQuery, RegisterRestaurantRequest, Restaurant, UpdateRestaurantRequest};
use crate::utils::errors::BaropotError;
use crate::utils::location::BoundingBox;

const RESTAURANT_COLUMNS: &str = "id, owner_id, name, category, address, lat, lng, description, phone_number, opening_time, closing_time, last_order_time, created_at, updated_at";

#[derive(Clone)]
pub struct RestaurantRepository {
    pool: PgPool,
}

impl RestaurantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new restaurant
    pub async fn create(&self, conn: &mut PgConnection, owner_id: i64, request: &RegisterRestaurantRequest) -> Result<Restaurant, BaropotError> {
        let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
            r#"
            INSERT INTO restaurants (owner_id, name, category, address, lat, lng, description, phone_number,
                                     opening_time, closing_time, last_order_time, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING {RESTAURANT_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(&request.name)
        .bind(request.category)
        .bind(&request.address)
        .bind(request.lat)
        .bind(request.lng)
        .bind(&request.description)
        .bind(&request.phone_number)
        .bind(request.opening_time)
        .bind(request.closing_time)
        .bind(request.last_order_time)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(restaurant)
    }

    /// Find restaurant by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Restaurant>, BaropotError> {
        let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(restaurant)
    }

    /// Check whether a restaurant exists
    pub async fn exists(&self, id: i64) -> Result<bool, BaropotError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM restaurants WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Search restaurants by the textual filters and an optional coordinate window
    pub async fn search(&self, query: &FindRestaurantsQuery, window: Option<BoundingBox>) -> Result<Vec<Restaurant>, BaropotError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE TRUE"
        ));

        if let Some(name) = &query.name {
            builder.push(" AND name ILIKE ").push_bind(format!("%{}%", name));
        }

        if !query.categories.is_empty() {
            let categories: Vec<String> = query.categories.iter().map(|c| c.as_str().to_string()).collect();
            builder.push(" AND category::text = ANY(").push_bind(categories).push(")");
        }

        if let Some(address) = &query.address {
            builder.push(" AND address ILIKE ").push_bind(format!("%{}%", address));
        }

        if let Some(window) = window {
            builder
                .push(" AND lat BETWEEN ").push_bind(window.min_lat)
                .push(" AND ").push_bind(window.max_lat)
                .push(" AND lng BETWEEN ").push_bind(window.min_lng)
                .push(" AND ").push_bind(window.max_lng);
        }

        builder.push(" ORDER BY created_at DESC");

        let restaurants = builder
            .build_query_as::<Restaurant>()
            .fetch_all(&self.pool)
            .await?;

        Ok(restaurants)
    }

    /// Update restaurant; absent fields keep their value
    pub async fn update(&self, conn: &mut PgConnection, id: i64, request: &UpdateRestaurantRequest) -> Result<Restaurant, BaropotError> {
        let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
            r#"
            UPDATE restaurants
            SET name = COALESCE($2, name),
                category = COALESCE($3, category),
                address = COALESCE($4, address),
                lat = COALESCE($5, lat),
                lng = COALESCE($6, lng),
                description = COALESCE($7, description),
                phone_number = COALESCE($8, phone_number),
                opening_time = COALESCE($9, opening_time),
                closing_time = COALESCE($10, closing_time),
                last_order_time = COALESCE($11, last_order_time),
                updated_at = $12
            WHERE id = $1
            RETURNING {RESTAURANT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&request.name)
        .bind(request.category)
        .bind(&request.address)
        .bind(request.lat)
        .bind(request.lng)
        .bind(&request.description)
        .bind(&request.phone_number)
        .bind(request.opening_time)
        .bind(request.closing_time)
        .bind(request.last_order_time)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(restaurant)
    }

    /// Delete restaurant
    pub async fn delete(&self, id: i64) -> Result<(), BaropotError> {
        sqlx::query("DELETE FROM restaurants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Replace the photo list
    pub async fn replace_photos(&self, conn: &mut PgConnection, id: i64, urls: &[String]) -> Result<(), BaropotError> {
        sqlx::query("DELETE FROM restaurant_photos WHERE restaurant_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if !urls.is_empty() {
            sqlx::query("INSERT INTO restaurant_photos (restaurant_id, url) SELECT $1, UNNEST($2::text[])")
                .bind(id)
                .bind(urls)
                .execute(&mut *conn)
                .await?;
        }

        Ok(())
    }

    /// Photo URLs grouped by restaurant
    pub async fn photos_for(&self, ids: &[i64]) -> Result<HashMap<i64, Vec<String>>, BaropotError> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            "SELECT restaurant_id, url FROM restaurant_photos WHERE restaurant_id = ANY($1) ORDER BY id"
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<String>> = HashMap::new();
        for (restaurant_id, url) in rows {
            grouped.entry(restaurant_id).or_default().push(url);
        }
        Ok(grouped)
    }

    /// Bookmark counts per restaurant
    pub async fn bookmark_counts(&self, ids: &[i64]) -> Result<HashMap<i64, i64>, BaropotError> {
        let rows = sqlx::query_as::<_, (i64, i64)>(
            "SELECT restaurant_id, COUNT(*) FROM restaurant_bookmarks WHERE restaurant_id = ANY($1) GROUP BY restaurant_id"
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// Subset of `ids` the user has bookmarked
    pub async fn bookmarked_by(&self, user_id: i64, ids: &[i64]) -> Result<HashSet<i64>, BaropotError> {
        let rows: Vec<i64> = sqlx::query_scalar(
            "SELECT restaurant_id FROM restaurant_bookmarks WHERE user_id = $1 AND restaurant_id = ANY($2)"
        )
        .bind(user_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
