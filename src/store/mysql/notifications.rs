use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{MySqlStore, now, parse_column};
use crate::model::{NewNotification, Notification};
use crate::store::{NotificationInbox, NotificationSink, StoreError};

#[derive(FromRow)]
struct NotificationRow {
    id: u64,
    user_id: u64,
    message: String,
    #[sqlx(rename = "type")]
    kind: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = StoreError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: row.id,
            recipient_id: row.user_id,
            message: row.message,
            kind: parse_column("notifications.type", &row.kind)?,
            read: row.is_read,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl NotificationSink for MySqlStore {
    async fn notify(&self, notification: NewNotification) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (user_id, message, type, is_read, created_at)
            VALUES (?, ?, ?, FALSE, ?)
            "#,
        )
        .bind(notification.recipient_id)
        .bind(&notification.message)
        .bind(notification.kind.as_ref())
        .bind(now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationInbox for MySqlStore {
    async fn notifications_for(&self, user_id: u64) -> Result<Vec<Notification>, StoreError> {
        sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, message, type, is_read, created_at
            FROM notifications
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Notification::try_from)
        .collect()
    }

    async fn mark_read(&self, user_id: u64, notification_id: u64) -> Result<bool, StoreError> {
        // Check ownership separately: MySQL reports 0 affected rows when the
        // flag was already set.
        let owned = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM notifications WHERE id = ? AND user_id = ?)",
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        if !owned {
            return Ok(false);
        }

        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = ? AND user_id = ?")
            .bind(notification_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(true)
    }

    async fn mark_all_read(&self, user_id: u64) -> Result<u64, StoreError> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = ? AND is_read = FALSE")
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}
