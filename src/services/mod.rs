//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod baropot;
pub mod bookmark;
pub mod coupon;
pub mod feed;
pub mod notification;
pub mod participation;
pub mod reservation;
pub mod restaurant;
pub mod review;
pub mod user;

// Re-export commonly used services
pub use auth::{AuthContext, AuthService, Claims};
pub use baropot::BaropotService;
pub use bookmark::BookmarkService;
pub use coupon::CouponService;
pub use feed::FeedService;
pub use notification::{HubStats, NotificationHub, NotificationService, Subscription, DEFAULT_CHANNEL_CAPACITY};
pub use participation::ParticipationService;
pub use reservation::ReservationService;
pub use restaurant::RestaurantService;
pub use review::ReviewService;
pub use user::UserService;

use crate::config::settings::Settings;
use crate::database::{health_check, DatabasePool, DatabaseService};

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub database: DatabaseService,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub restaurant_service: RestaurantService,
    pub bookmark_service: BookmarkService,
    pub reservation_service: ReservationService,
    pub baropot_service: BaropotService,
    pub participation_service: ParticipationService,
    pub review_service: ReviewService,
    pub feed_service: FeedService,
    pub coupon_service: CouponService,
    pub notification_service: NotificationService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized.
    ///
    /// Spawns the notification hub, so this must run inside a Tokio runtime.
    pub fn new(settings: &Settings, pool: DatabasePool) -> Self {
        let database = DatabaseService::new(pool);
        let hub = NotificationHub::spawn(DEFAULT_CHANNEL_CAPACITY);

        let notification_service = NotificationService::new(database.notifications.clone(), hub);
        let restaurant_service = RestaurantService::new(database.clone(), settings.search.clone());

        Self {
            auth_service: AuthService::new(&settings.auth),
            user_service: UserService::new(database.users.clone()),
            bookmark_service: BookmarkService::new(
                database.clone(),
                restaurant_service.clone(),
                notification_service.clone(),
            ),
            reservation_service: ReservationService::new(database.clone(), &settings.scheduler),
            baropot_service: BaropotService::new(database.clone(), notification_service.clone(), settings.search.clone()),
            participation_service: ParticipationService::new(database.clone(), notification_service.clone()),
            review_service: ReviewService::new(database.clone(), notification_service.clone()),
            feed_service: FeedService::new(database.clone()),
            coupon_service: CouponService::new(database.clone()),
            restaurant_service,
            notification_service,
            database,
        }
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let database_healthy = health_check(self.database.pool()).await.is_ok();
        let hub = self.notification_service.hub_stats().await.ok();

        ServiceHealthStatus {
            database_healthy,
            notification_hub_running: hub.is_some(),
            live_subscriptions: hub.map(|s| s.subscriptions).unwrap_or(0),
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone, serde::Serialize)]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
    pub notification_hub_running: bool,
    pub live_subscriptions: usize,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.database_healthy && self.notification_hub_running
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }
        if !self.notification_hub_running {
            issues.push("Notification hub stopped".to_string());
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_issues() {
        let status = ServiceHealthStatus {
            database_healthy: false,
            notification_hub_running: true,
            live_subscriptions: 0,
        };
        assert!(!status.is_healthy());
        assert_eq!(status.get_issues(), vec!["Database connection failed".to_string()]);
    }
}
