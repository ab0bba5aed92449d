//! Coupon handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::AppState;
use crate::middleware::AuthUser;
use crate::models::coupon::{Coupon, CreateCouponRequest};
use crate::utils::errors::Result;

pub async fn find_active(State(state): State<AppState>) -> Result<Json<Vec<Coupon>>> {
    Ok(Json(state.services.coupon_service.find_active().await?))
}

pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<CreateCouponRequest>,
) -> Result<(StatusCode, Json<Coupon>)> {
    let coupon = state.services.coupon_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

pub async fn find_one(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Coupon>> {
    Ok(Json(state.services.coupon_service.find_one(id).await?))
}
