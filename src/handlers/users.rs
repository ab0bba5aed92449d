//! Handlers for the caller's own profile and lists

use axum::{
    extract::{Query, State},
    Json,
};

use super::query::{baropot_query, QueryParams};
use super::AppState;
use crate::middleware::AuthUser;
use crate::models::baropot::{BaropotStatus, BaropotView};
use crate::models::reservation::Reservation;
use crate::models::restaurant::RestaurantView;
use crate::models::user::{UpdateProfileRequest, User};
use crate::utils::errors::Result;

pub async fn me(State(state): State<AppState>, user: AuthUser) -> Result<Json<User>> {
    Ok(Json(state.services.user_service.me(user.user_id).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<User>> {
    Ok(Json(state.services.user_service.update_profile(user.user_id, request).await?))
}

/// Baropots the caller has a participant row in, any status unless filtered
pub async fn my_baropots(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<BaropotView>>> {
    let mut query = baropot_query(&QueryParams::new(pairs), BaropotStatus::ALL)?;
    query.participant_user_id = Some(user.user_id);

    Ok(Json(state.services.baropot_service.find_all(&query).await?))
}

pub async fn my_bookmarks(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<RestaurantView>>> {
    Ok(Json(state.services.bookmark_service.list_for_user(user.user_id).await?))
}

pub async fn my_reservations(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<Reservation>>> {
    Ok(Json(state.services.reservation_service.list_for_user(user.user_id).await?))
}
