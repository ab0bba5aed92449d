//! Feed, comment and like handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::AppState;
use crate::middleware::{AuthUser, OptionalAuthUser};
use crate::models::feed::{ContentRequest, FeedComment, FeedView};
use crate::utils::errors::Result;

pub async fn find_all(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
) -> Result<Json<Vec<FeedView>>> {
    Ok(Json(state.services.feed_service.find_all(viewer).await?))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ContentRequest>,
) -> Result<(StatusCode, Json<FeedView>)> {
    let view = state.services.feed_service.create(user.user_id, &request.content).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn find_one(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(id): Path<i64>,
) -> Result<Json<FeedView>> {
    Ok(Json(state.services.feed_service.find_one(id, viewer).await?))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<ContentRequest>,
) -> Result<Json<FeedView>> {
    Ok(Json(state.services.feed_service.update(user.user_id, id, &request.content).await?))
}

pub async fn delete(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<StatusCode> {
    state.services.feed_service.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<ContentRequest>,
) -> Result<(StatusCode, Json<FeedComment>)> {
    let comment = state.services.feed_service.add_comment(user.user_id, id, &request.content).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<ContentRequest>,
) -> Result<Json<FeedComment>> {
    Ok(Json(state.services.feed_service.update_comment(user.user_id, id, &request.content).await?))
}

pub async fn delete_comment(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<StatusCode> {
    state.services.feed_service.delete_comment(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn like(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<FeedView>)> {
    let view = state.services.feed_service.like(user.user_id, id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn unlike(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<StatusCode> {
    state.services.feed_service.unlike(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
