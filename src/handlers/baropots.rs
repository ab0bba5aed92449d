//! Baropot and participation handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::query::{baropot_query, QueryParams};
use super::AppState;
use crate::middleware::AuthUser;
use crate::models::baropot::{
    BaropotStatus, BaropotView, CreateBaropotRequest, DecisionRequest, JoinRequest, UpdateBaropotRequest,
    UpdateStatusRequest,
};
use crate::utils::errors::Result;

pub async fn find_all(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<BaropotView>>> {
    let query = baropot_query(&QueryParams::new(pairs), &[BaropotStatus::Open])?;
    Ok(Json(state.services.baropot_service.find_all(&query).await?))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateBaropotRequest>,
) -> Result<(StatusCode, Json<BaropotView>)> {
    let view = state.services.baropot_service.create(user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn find_one(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<BaropotView>> {
    Ok(Json(state.services.baropot_service.find_by_id(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateBaropotRequest>,
) -> Result<Json<BaropotView>> {
    Ok(Json(state.services.baropot_service.update(id, user.user_id, request).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<BaropotView>> {
    Ok(Json(state.services.baropot_service.update_status(id, user.user_id, request.status).await?))
}

/// The body is optional; a missing body means no join message
pub async fn request_join(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    request: Option<Json<JoinRequest>>,
) -> Result<Json<bool>> {
    let message = request.and_then(|Json(r)| r.join_message);
    Ok(Json(state.services.participation_service.request_join(id, user.user_id, message).await?))
}

pub async fn decide_join_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<bool>> {
    let handled = state
        .services
        .participation_service
        .decide_join_request(id, user.user_id, request.participant_user_id, request.joined_status, request.host_memo)
        .await?;
    Ok(Json(handled))
}

pub async fn cancel_join(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<Json<bool>> {
    Ok(Json(state.services.participation_service.cancel_join(id, user.user_id).await?))
}
