//! Database service layer
//!
//! This module bundles the repositories over one pool and hands out transactions

use sqlx::{Postgres, Transaction};
use crate::database::repositories::{
    BaropotRepository, BookmarkRepository, CouponRepository, FeedRepository, NotificationRepository,
    ReservationRepository, RestaurantRepository, ReviewRepository, TagRepository, TagScope, UserRepository,
};
use crate::database::DatabasePool;
use crate::utils::errors::BaropotError;

#[derive(Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub users: UserRepository,
    pub restaurants: RestaurantRepository,
    pub restaurant_tags: TagRepository,
    pub bookmarks: BookmarkRepository,
    pub reservations: ReservationRepository,
    pub baropots: BaropotRepository,
    pub baropot_tags: TagRepository,
    pub notifications: NotificationRepository,
    pub reviews: ReviewRepository,
    pub feeds: FeedRepository,
    pub coupons: CouponRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            restaurants: RestaurantRepository::new(pool.clone()),
            restaurant_tags: TagRepository::new(pool.clone(), TagScope::Restaurant),
            bookmarks: BookmarkRepository::new(pool.clone()),
            reservations: ReservationRepository::new(pool.clone()),
            baropots: BaropotRepository::new(pool.clone()),
            baropot_tags: TagRepository::new(pool.clone(), TagScope::Baropot),
            notifications: NotificationRepository::new(pool.clone()),
            reviews: ReviewRepository::new(pool.clone()),
            feeds: FeedRepository::new(pool.clone()),
            coupons: CouponRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Start a transaction; it rolls back unless committed
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, BaropotError> {
        Ok(self.pool.begin().await?)
    }
}
