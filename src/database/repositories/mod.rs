//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod tag;
pub mod restaurant;
pub mod bookmark;
pub mod reservation;
pub mod baropot;
pub mod notification;
pub mod review;
pub mod feed;
pub mod coupon;

// Re-export repositories
pub use user::UserRepository;
pub use tag::{TagRepository, TagScope};
pub use restaurant::RestaurantRepository;
pub use bookmark::BookmarkRepository;
pub use reservation::{NewReservation, ReservationRepository};
pub use baropot::{BaropotChanges, BaropotRepository, BaropotRow, NewBaropot, ParticipantRow};
pub use notification::NotificationRepository;
pub use review::ReviewRepository;
pub use feed::FeedRepository;
pub use coupon::{CouponRepository, NewCoupon};
