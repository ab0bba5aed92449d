//! Coupon repository

use sqlx::PgPool;
use chrono::{NaiveDate, Utc};
use crate::models::coupon::{Coupon, DiscountType};
use crate::utils::errors::BaropotError;

const COUPON_COLUMNS: &str = "id, name, description, expired_at, discount_type, amount, created_at, updated_at";

/// Validated coupon fields ready for insertion
#[derive(Debug, Clone)]
pub struct NewCoupon {
    pub name: String,
    pub description: Option<String>,
    pub expired_at: NaiveDate,
    pub discount_type: DiscountType,
    pub amount: i32,
}

#[derive(Clone)]
pub struct CouponRepository {
    pool: PgPool,
}

impl CouponRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: &NewCoupon) -> Result<Coupon, BaropotError> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            r#"
            INSERT INTO coupons (name, description, expired_at, discount_type, amount, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {COUPON_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.expired_at)
        .bind(new.discount_type)
        .bind(new.amount)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(coupon)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Coupon>, BaropotError> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(coupon)
    }

    /// Coupons still valid on `today`, soonest expiry first
    pub async fn list_active(&self, today: NaiveDate) -> Result<Vec<Coupon>, BaropotError> {
        let coupons = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE expired_at >= $1 ORDER BY expired_at, id"
        ))
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        Ok(coupons)
    }
}
