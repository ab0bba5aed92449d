//! Restaurant review handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::AppState;
use crate::middleware::AuthUser;
use crate::models::review::{CreateReviewRequest, ReviewView, UpdateReviewRequest};
use crate::utils::errors::Result;

pub async fn find_all(State(state): State<AppState>, Path(restaurant_id): Path<i64>) -> Result<Json<Vec<ReviewView>>> {
    Ok(Json(state.services.review_service.find_all(restaurant_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(restaurant_id): Path<i64>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewView>)> {
    let view = state.services.review_service.create(user.user_id, restaurant_id, request).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn find_one(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<ReviewView>> {
    Ok(Json(state.services.review_service.find_one(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<ReviewView>> {
    Ok(Json(state.services.review_service.update(user.user_id, id, request).await?))
}

pub async fn delete(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<StatusCode> {
    state.services.review_service.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
