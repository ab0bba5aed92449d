//! Coupon models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "discount_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    #[default]
    Percentage,
    FixedAmount,
}

labelled_enum!(DiscountType {
    Percentage => "PERCENTAGE",
    FixedAmount => "FIXED_AMOUNT",
});

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub expired_at: NaiveDate,
    pub discount_type: DiscountType,
    pub amount: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// yyyy-MM-dd
    pub expired_at: String,
    #[serde(default)]
    pub discount_type: DiscountType,
    pub amount: i32,
}
