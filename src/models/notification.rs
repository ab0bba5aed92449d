//! Notification model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "notification_kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Review,
    Bookmark,
    BaropotDatetimeChanged,
    BaropotParticipantJoined,
    BaropotJoinRequestApproved,
    BaropotJoinRequestRejected,
    BaropotParticipantRemoved,
    BaropotJoinCancelled,
    BaropotStatusUpdated,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Review => "REVIEW",
            NotificationKind::Bookmark => "BOOKMARK",
            NotificationKind::BaropotDatetimeChanged => "BAROPOT_DATETIME_CHANGED",
            NotificationKind::BaropotParticipantJoined => "BAROPOT_PARTICIPANT_JOINED",
            NotificationKind::BaropotJoinRequestApproved => "BAROPOT_JOIN_REQUEST_APPROVED",
            NotificationKind::BaropotJoinRequestRejected => "BAROPOT_JOIN_REQUEST_REJECTED",
            NotificationKind::BaropotParticipantRemoved => "BAROPOT_PARTICIPANT_REMOVED",
            NotificationKind::BaropotJoinCancelled => "BAROPOT_JOIN_CANCELLED",
            NotificationKind::BaropotStatusUpdated => "BAROPOT_STATUS_UPDATED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub kind: NotificationKind,
    pub message: String,
    pub is_read: bool,
    pub recipient_id: i64,
    pub sender_id: Option<i64>,
    /// Restaurant the notification refers to
    pub context_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub message: String,
    pub recipient_id: i64,
    pub sender_id: Option<i64>,
    pub context_id: Option<i64>,
}
