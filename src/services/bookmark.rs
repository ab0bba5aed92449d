//! Bookmark service implementation

use tracing::info;
use crate::database::DatabaseService;
use crate::models::notification::NotificationKind;
use crate::models::restaurant::{Bookmark, RestaurantView};
use crate::services::notification::{owner_notice, NotificationService};
use crate::services::restaurant::RestaurantService;
use crate::utils::errors::{BaropotError, Result};

#[derive(Clone)]
pub struct BookmarkService {
    db: DatabaseService,
    restaurants: RestaurantService,
    notifications: NotificationService,
}

impl BookmarkService {
    pub fn new(db: DatabaseService, restaurants: RestaurantService, notifications: NotificationService) -> Self {
        Self { db, restaurants, notifications }
    }

    /// Bookmark a restaurant; bookmarking twice is a conflict. The owner hears
    /// about bookmarks from other users.
    pub async fn add(&self, user_id: i64, restaurant_id: i64) -> Result<Bookmark> {
        let restaurant = self
            .db
            .restaurants
            .find_by_id(restaurant_id)
            .await?
            .ok_or_else(|| BaropotError::not_found("Restaurant", restaurant_id))?;

        let bookmark = self
            .db
            .bookmarks
            .insert(user_id, restaurant_id)
            .await?
            .ok_or_else(|| BaropotError::conflict("restaurant is already bookmarked"))?;

        info!(user_id = user_id, restaurant_id = restaurant_id, "Restaurant bookmarked");

        let notice = owner_notice(
            NotificationKind::Bookmark,
            format!("\"{}\" was bookmarked.", restaurant.name),
            restaurant.owner_id,
            user_id,
            restaurant_id,
        );
        if let Some(notice) = notice {
            self.notifications.notify(notice).await;
        }

        Ok(bookmark)
    }

    pub async fn remove(&self, user_id: i64, restaurant_id: i64) -> Result<()> {
        if !self.db.bookmarks.delete(user_id, restaurant_id).await? {
            return Err(BaropotError::not_found("Bookmark", restaurant_id));
        }

        info!(user_id = user_id, restaurant_id = restaurant_id, "Bookmark removed");
        Ok(())
    }

    /// Bookmarked restaurants, newest bookmark first
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<RestaurantView>> {
        let restaurants = self.db.bookmarks.restaurants_for_user(user_id).await?;
        let rows = restaurants.into_iter().map(|r| (r, None)).collect();
        self.restaurants.decorate(rows, Some(user_id)).await
    }
}
