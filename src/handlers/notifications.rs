//! Notification handlers, including the server-sent event stream

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use serde_json::{json, Value};
use tracing::info;

use super::AppState;
use crate::middleware::AuthUser;
use crate::models::notification::Notification;
use crate::utils::errors::Result;

pub async fn unread(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<Notification>>> {
    Ok(Json(state.services.notification_service.unread(user.user_id).await?))
}

pub async fn mark_as_read(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<Json<Value>> {
    state.services.notification_service.mark_as_read(id, user.user_id).await?;
    Ok(Json(json!({ "success": true })))
}

/// Live notifications as `message` events; the subscription ends with the connection
pub async fn stream(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>>> {
    let subscription = state.services.notification_service.subscribe(user.user_id).await?;
    info!(user_id = user.user_id, "Notification stream opened");

    let events = subscription.into_stream().map(|notification| to_event(&notification));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn to_event(notification: &Notification) -> std::result::Result<Event, axum::Error> {
    Event::default()
        .event("message")
        .id(notification.id.to_string())
        .json_data(notification)
}
