//! Coupon service implementation

use chrono::NaiveDate;
use tracing::info;

use crate::database::repositories::NewCoupon;
use crate::database::DatabaseService;
use crate::models::coupon::{Coupon, CreateCouponRequest, DiscountType};
use crate::utils::errors::{BaropotError, Result};
use crate::utils::helpers::{normalize_whitespace, parse_date};

#[derive(Clone)]
pub struct CouponService {
    db: DatabaseService,
}

impl CouponService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    pub async fn create(&self, request: CreateCouponRequest) -> Result<Coupon> {
        let new = validate_coupon(request, today())?;
        let coupon = self.db.coupons.create(&new).await?;

        info!(coupon_id = coupon.id, discount_type = coupon.discount_type.as_str(), "Coupon created");
        Ok(coupon)
    }

    pub async fn find_one(&self, coupon_id: i64) -> Result<Coupon> {
        self.db
            .coupons
            .find_by_id(coupon_id)
            .await?
            .ok_or_else(|| BaropotError::not_found("Coupon", coupon_id))
    }

    /// Coupons that have not expired yet
    pub async fn find_active(&self) -> Result<Vec<Coupon>> {
        self.db.coupons.list_active(today()).await
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Check a coupon request against `today` and normalize its fields
pub fn validate_coupon(request: CreateCouponRequest, today: NaiveDate) -> Result<NewCoupon> {
    let name = normalize_whitespace(&request.name);
    if name.is_empty() {
        return Err(BaropotError::validation("coupon name cannot be empty"));
    }

    if request.amount <= 0 {
        return Err(BaropotError::validation("discount amount must be positive"));
    }
    if request.discount_type == DiscountType::Percentage && request.amount > 100 {
        return Err(BaropotError::validation("a percentage discount cannot exceed 100"));
    }

    let expired_at = parse_date(&request.expired_at)?;
    if expired_at < today {
        return Err(BaropotError::validation(format!("coupon already expired on {expired_at}")));
    }

    let description = request
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    Ok(NewCoupon {
        name,
        description,
        expired_at,
        discount_type: request.discount_type,
        amount: request.amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn request(discount_type: DiscountType, amount: i32, expired_at: &str) -> CreateCouponRequest {
        CreateCouponRequest {
            name: "  Welcome   back ".to_string(),
            description: Some("  ".to_string()),
            expired_at: expired_at.to_string(),
            discount_type,
            amount,
        }
    }

    fn day(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_valid_coupon_is_normalized() {
        let new = validate_coupon(request(DiscountType::Percentage, 15, "2030-01-31"), day("2030-01-01")).unwrap();
        assert_eq!(new.name, "Welcome back");
        assert_eq!(new.description, None);
        assert_eq!(new.expired_at, day("2030-01-31"));

        // Expiring today is still valid
        assert!(validate_coupon(request(DiscountType::FixedAmount, 5000, "2030-01-01"), day("2030-01-01")).is_ok());
    }

    #[test]
    fn test_invalid_coupons() {
        let today = day("2030-01-01");
        for bad in [
            request(DiscountType::Percentage, 0, "2030-02-01"),
            request(DiscountType::Percentage, 101, "2030-02-01"),
            request(DiscountType::FixedAmount, -500, "2030-02-01"),
            request(DiscountType::FixedAmount, 500, "2029-12-31"),
            request(DiscountType::FixedAmount, 500, "01/02/2030"),
        ] {
            assert_matches!(validate_coupon(bad, today), Err(BaropotError::Validation(_)));
        }

        let mut blank = request(DiscountType::Percentage, 10, "2030-02-01");
        blank.name = "   ".to_string();
        assert_matches!(validate_coupon(blank, today), Err(BaropotError::Validation(_)));
    }
}
