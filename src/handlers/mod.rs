//! HTTP handlers module
//!
//! This module contains the axum handlers organized by resource:
//! - Health and readiness checks
//! - Users (the caller's profile and personal lists)
//! - Restaurants, bookmarks and reservations
//! - Restaurant reviews
//! - Baropots and their participants
//! - The social feed with comments and likes
//! - Coupons
//! - Notifications, including the live stream

pub mod baropots;
pub mod coupons;
pub mod feeds;
pub mod health;
pub mod notifications;
pub mod query;
pub mod restaurants;
pub mod reviews;
pub mod users;

use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::middleware::log_requests;
use crate::services::{AuthService, ServiceFactory, UserService};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub services: ServiceFactory,
}

impl AppState {
    pub fn new(services: ServiceFactory) -> Self {
        Self { services }
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.services.auth_service.clone()
    }
}

impl FromRef<AppState> for UserService {
    fn from_ref(state: &AppState) -> Self {
        state.services.user_service.clone()
    }
}

/// CORS for the configured origins; an empty list or `*` allows any origin
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Skipping invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}

/// Build the application router
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/users/me", get(users::me).patch(users::update_profile))
        .route("/users/me/baropots", get(users::my_baropots))
        .route("/users/me/bookmarks", get(users::my_bookmarks))
        .route("/users/me/reservations", get(users::my_reservations))
        .route("/restaurants", get(restaurants::find_all).post(restaurants::register))
        .route(
            "/restaurants/:id",
            get(restaurants::find_one).put(restaurants::update).delete(restaurants::delete),
        )
        .route(
            "/restaurants/:id/bookmarks",
            post(restaurants::add_bookmark).delete(restaurants::remove_bookmark),
        )
        .route("/restaurants/:id/reservations", post(restaurants::create_reservation))
        .route("/restaurants/:id/reviews", get(reviews::find_all).post(reviews::create))
        .route(
            "/reviews/:id",
            get(reviews::find_one).patch(reviews::update).delete(reviews::delete),
        )
        .route("/baropots", get(baropots::find_all).post(baropots::create))
        .route("/baropots/:id", get(baropots::find_one).patch(baropots::update))
        .route("/baropots/:id/status", patch(baropots::update_status))
        .route(
            "/baropots/:id/participants",
            post(baropots::request_join)
                .patch(baropots::decide_join_request)
                .delete(baropots::cancel_join),
        )
        .route("/feeds", get(feeds::find_all).post(feeds::create))
        .route(
            "/feeds/:id",
            get(feeds::find_one).patch(feeds::update).delete(feeds::delete),
        )
        .route("/feeds/:id/comments", post(feeds::add_comment))
        .route("/feeds/:id/likes", post(feeds::like).delete(feeds::unlike))
        .route(
            "/comments/:id",
            patch(feeds::update_comment).delete(feeds::delete_comment),
        )
        .route("/coupons", get(coupons::find_active).post(coupons::create))
        .route("/coupons/:id", get(coupons::find_one))
        .route("/notifications", get(notifications::unread))
        .route("/notifications/stream", get(notifications::stream))
        .route("/notifications/:id/read", post(notifications::mark_as_read))
        .layer(axum::middleware::from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}
