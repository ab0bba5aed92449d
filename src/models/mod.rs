//! Data models module
//!
//! This module contains all data structures used throughout the application

/// Implements `as_str` and `FromStr` for enums stored as SCREAMING_SNAKE_CASE labels
macro_rules! labelled_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::utils::errors::BaropotError;

            fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
                match value.trim().to_ascii_uppercase().as_str() {
                    $($label => Ok($name::$variant),)+
                    other => Err(crate::utils::errors::BaropotError::Validation(format!(
                        "unknown {}: {}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

pub mod user;
pub mod restaurant;
pub mod reservation;
pub mod baropot;
pub mod notification;
pub mod review;
pub mod feed;
pub mod coupon;

// Re-export commonly used models
pub use user::{User, UpdateProfileRequest};
pub use restaurant::{
    Bookmark, FindRestaurantsQuery, RegisterRestaurantRequest, Restaurant, RestaurantCategory,
    RestaurantView, UpdateRestaurantRequest,
};
pub use reservation::{CreateReservationRequest, Reservation, ReservationStatus};
pub use baropot::{
    Baropot, BaropotStatus, BaropotView, ContactMethod, CreateBaropotRequest, Decision,
    DecisionRequest, FindBaropotsQuery, HostView, JoinRequest, JoinedStatus, Participant,
    ParticipantAgeGroup, ParticipantGender, ParticipantView, PaymentMethod, UpdateBaropotRequest,
    UpdateStatusRequest,
};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use review::{CreateReviewRequest, Review, ReviewView, UpdateReviewRequest};
pub use feed::{ContentRequest, Feed, FeedComment, FeedView};
pub use coupon::{Coupon, CreateCouponRequest, DiscountType};
