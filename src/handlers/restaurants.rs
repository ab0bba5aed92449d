//! Restaurant, bookmark and reservation handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::query::{restaurant_query, QueryParams};
use super::AppState;
use crate::middleware::{AuthUser, OptionalAuthUser};
use crate::models::reservation::{CreateReservationRequest, Reservation};
use crate::models::restaurant::{Bookmark, RegisterRestaurantRequest, RestaurantView, UpdateRestaurantRequest};
use crate::utils::errors::Result;

pub async fn find_all(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<RestaurantView>>> {
    let query = restaurant_query(&QueryParams::new(pairs))?;
    Ok(Json(state.services.restaurant_service.find_all(&query, viewer).await?))
}

pub async fn register(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<RegisterRestaurantRequest>,
) -> Result<(StatusCode, Json<RestaurantView>)> {
    let view = state.services.restaurant_service.register(user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn find_one(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(id): Path<i64>,
) -> Result<Json<RestaurantView>> {
    Ok(Json(state.services.restaurant_service.find_one(id, viewer).await?))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateRestaurantRequest>,
) -> Result<Json<RestaurantView>> {
    Ok(Json(state.services.restaurant_service.update(user.user_id, id, request).await?))
}

pub async fn delete(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<StatusCode> {
    state.services.restaurant_service.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_bookmark(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<Bookmark>)> {
    let bookmark = state.services.bookmark_service.add(user.user_id, id).await?;
    Ok((StatusCode::CREATED, Json(bookmark)))
}

pub async fn remove_bookmark(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<StatusCode> {
    state.services.bookmark_service.remove(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_reservation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>)> {
    let reservation = state.services.reservation_service.create(user.user_id, id, request).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}
