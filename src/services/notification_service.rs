use crate::error::{Error, Result};
use crate::models::notification::{NewNotification, Notification, NOTIFICATION_COLUMNS};
use sqlx::{PgExecutor, PgPool};

const DEFAULT_LIST_LIMIT: i64 = 50;

#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, notification: &NewNotification) -> Result<Notification> {
        insert_notification(&self.pool, notification).await
    }

    /// Inserts a notification whose failure must not fail the caller. Errors are logged.
    pub async fn create_best_effort(&self, notification: &NewNotification) -> Option<Notification> {
        match self.create(notification).await {
            Ok(created) => Some(created),
            Err(e) => {
                tracing::warn!(
                    user_id = %notification.user_id,
                    kind = notification.notification_type.as_str(),
                    error = ?e,
                    "failed to create notification"
                );
                None
            }
        }
    }

    pub async fn list_for_user(
        &self,
        user_id: &str,
        unread_only: bool,
        limit: Option<i64>,
    ) -> Result<Vec<Notification>> {
        let sql = format!(
            "SELECT {} FROM notifications
             WHERE user_id = $1 AND ($2 = FALSE OR read = FALSE)
             ORDER BY created_at DESC, id DESC
             LIMIT $3",
            NOTIFICATION_COLUMNS
        );
        let items = sqlx::query_as::<_, Notification>(&sql)
            .bind(user_id)
            .bind(unread_only)
            .bind(limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, 100))
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn unread_count(&self, user_id: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn mark_read(&self, id: i64, user_id: &str) -> Result<()> {
        let res = sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("notification_not_found".into()));
        }
        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
        let res = sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    pub async fn delete(&self, id: i64, user_id: &str) -> Result<()> {
        let res = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("notification_not_found".into()));
        }
        Ok(())
    }
}

pub async fn insert_notification<'e, E: PgExecutor<'e>>(
    executor: E,
    notification: &NewNotification,
) -> Result<Notification> {
    let sql = format!(
        "INSERT INTO notifications (user_id, type, title, message, job_id, application_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {}",
        NOTIFICATION_COLUMNS
    );
    let row = sqlx::query_as::<_, Notification>(&sql)
        .bind(&notification.user_id)
        .bind(notification.notification_type.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.job_id)
        .bind(notification.application_id)
        .fetch_one(executor)
        .await?;
    Ok(row)
}
