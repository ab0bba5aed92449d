//! Notification repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::notification::{NewNotification, Notification};
use crate::utils::errors::BaropotError;

const NOTIFICATION_COLUMNS: &str = "id, kind, message, is_read, recipient_id, sender_id, context_id, created_at";

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a notification
    pub async fn create(&self, new: &NewNotification) -> Result<Notification, BaropotError> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            r#"
            INSERT INTO notifications (kind, message, is_read, recipient_id, sender_id, context_id, created_at)
            VALUES ($1, $2, FALSE, $3, $4, $5, $6)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(new.kind)
        .bind(&new.message)
        .bind(new.recipient_id)
        .bind(new.sender_id)
        .bind(new.context_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Unread notifications of a user, newest first
    pub async fn unread_for(&self, recipient_id: i64) -> Result<Vec<Notification>, BaropotError> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE recipient_id = $1 AND NOT is_read ORDER BY created_at DESC, id DESC"
        ))
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Mark as read if owned by the recipient; returns whether a row matched
    pub async fn mark_read(&self, id: i64, recipient_id: i64) -> Result<bool, BaropotError> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1 AND recipient_id = $2")
            .bind(id)
            .bind(recipient_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
