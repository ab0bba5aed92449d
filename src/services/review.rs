//! Restaurant review service
//!
//! Reviews carry a 1-5 rating, text and photos. Only the author may edit or
//! delete a review; the restaurant owner hears about reviews left by others.

use tracing::info;

use crate::database::DatabaseService;
use crate::models::notification::NotificationKind;
use crate::models::review::{CreateReviewRequest, Review, ReviewView, UpdateReviewRequest};
use crate::services::notification::{owner_notice, NotificationService};
use crate::utils::errors::{BaropotError, Result};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Clone)]
pub struct ReviewService {
    db: DatabaseService,
    notifications: NotificationService,
}

impl ReviewService {
    pub fn new(db: DatabaseService, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// Review a restaurant; the owner is notified unless they wrote it
    pub async fn create(&self, user_id: i64, restaurant_id: i64, request: CreateReviewRequest) -> Result<ReviewView> {
        check_rating(request.rating)?;
        let content = review_content(&request.content)?;

        let restaurant = self
            .db
            .restaurants
            .find_by_id(restaurant_id)
            .await?
            .ok_or_else(|| BaropotError::not_found("Restaurant", restaurant_id))?;

        let mut tx = self.db.begin().await?;
        let review_id = self
            .db
            .reviews
            .create(&mut tx, restaurant_id, user_id, request.rating, &content)
            .await?;
        self.db.reviews.replace_photos(&mut tx, review_id, &request.photos).await?;
        tx.commit().await?;

        info!(review_id = review_id, restaurant_id = restaurant_id, user_id = user_id, "Review created");

        let notice = owner_notice(
            NotificationKind::Review,
            format!("\"{}\" received a new review.", restaurant.name),
            restaurant.owner_id,
            user_id,
            restaurant_id,
        );
        if let Some(notice) = notice {
            self.notifications.notify(notice).await;
        }

        self.find_one(review_id).await
    }

    /// Reviews of a restaurant, newest first
    pub async fn find_all(&self, restaurant_id: i64) -> Result<Vec<ReviewView>> {
        if !self.db.restaurants.exists(restaurant_id).await? {
            return Err(BaropotError::not_found("Restaurant", restaurant_id));
        }

        let reviews = self.db.reviews.list_for_restaurant(restaurant_id).await?;
        self.decorate(reviews).await
    }

    pub async fn find_one(&self, review_id: i64) -> Result<ReviewView> {
        let review = self.get(review_id).await?;
        let mut views = self.decorate(vec![review]).await?;
        views.pop().ok_or_else(|| BaropotError::not_found("Review", review_id))
    }

    /// Author-only edit; photos are replaced when present
    pub async fn update(&self, user_id: i64, review_id: i64, request: UpdateReviewRequest) -> Result<ReviewView> {
        let current = self.get(review_id).await?;
        ensure_author(&current, user_id)?;

        if let Some(rating) = request.rating {
            check_rating(rating)?;
        }
        let content = request.content.as_deref().map(review_content).transpose()?;

        let mut tx = self.db.begin().await?;
        self.db
            .reviews
            .update(&mut tx, review_id, request.rating, content.as_deref())
            .await?;
        if let Some(photos) = &request.photos {
            self.db.reviews.replace_photos(&mut tx, review_id, photos).await?;
        }
        tx.commit().await?;

        info!(review_id = review_id, user_id = user_id, "Review updated");
        self.find_one(review_id).await
    }

    /// Author-only delete
    pub async fn delete(&self, user_id: i64, review_id: i64) -> Result<()> {
        let current = self.get(review_id).await?;
        ensure_author(&current, user_id)?;

        self.db.reviews.delete(review_id).await?;
        info!(review_id = review_id, user_id = user_id, "Review deleted");
        Ok(())
    }

    async fn get(&self, review_id: i64) -> Result<Review> {
        self.db
            .reviews
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| BaropotError::not_found("Review", review_id))
    }

    async fn decorate(&self, reviews: Vec<Review>) -> Result<Vec<ReviewView>> {
        if reviews.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<i64> = reviews.iter().map(|r| r.id).collect();
        let mut photos = self.db.reviews.photos_for(&ids).await?;

        Ok(reviews
            .into_iter()
            .map(|review| ReviewView {
                photos: photos.remove(&review.id).unwrap_or_default(),
                review,
            })
            .collect())
    }
}

fn check_rating(rating: i32) -> Result<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(BaropotError::validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )));
    }
    Ok(())
}

fn review_content(content: &str) -> Result<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(BaropotError::validation("review content cannot be empty"));
    }
    Ok(content.to_string())
}

fn ensure_author(review: &Review, user_id: i64) -> Result<()> {
    if review.user_id != user_id {
        return Err(BaropotError::forbidden(format!("only the author may modify review {}", review.id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    #[test]
    fn test_rating_bounds() {
        assert!(check_rating(1).is_ok());
        assert!(check_rating(5).is_ok());
        assert_matches!(check_rating(0), Err(BaropotError::Validation(_)));
        assert_matches!(check_rating(6), Err(BaropotError::Validation(_)));
    }

    #[test]
    fn test_review_content_is_trimmed() {
        assert_eq!(review_content("  tender gopchang \n").unwrap(), "tender gopchang");
        assert_matches!(review_content(" \t "), Err(BaropotError::Validation(_)));
    }

    #[test]
    fn test_only_author_may_modify() {
        let review = Review {
            id: 4,
            restaurant_id: 1,
            rating: 3,
            content: "ok".to_string(),
            user_id: 8,
            user_name: "Park".to_string(),
            user_email: "park@example.com".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(ensure_author(&review, 8).is_ok());
        assert_matches!(ensure_author(&review, 9), Err(BaropotError::Forbidden(_)));
    }
}
