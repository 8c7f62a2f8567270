use crate::error::{AppError, AppResult};
use crate::models::{CreateNotification, Notification, NotificationKind, NotificationPriority};
use crate::websocket::{RoomRegistry, WsOutboundEvent};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Creates, reads and mutates notification state, and keeps connected
/// clients in sync by pushing every visible delta to the owner's user room.
///
/// The push is a hint, never part of the contract: a notification whose
/// `new_notification` event was lost is still found by the next
/// `list_for_user` pull.
pub struct NotificationCenter {
    db: PgPool,
    registry: RoomRegistry,
}

fn notification_from_row(row: &PgRow) -> AppResult<Notification> {
    let kind_str: String = row.get("kind");
    let priority_str: String = row.get("priority");

    Ok(Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        message: row.get("message"),
        kind: NotificationKind::parse(&kind_str)
            .ok_or_else(|| AppError::Database(format!("unknown notification kind: {kind_str}")))?,
        related_id: row.get("related_id"),
        priority: NotificationPriority::parse(&priority_str).ok_or_else(|| {
            AppError::Database(format!("unknown notification priority: {priority_str}"))
        })?,
        is_read: row.get("is_read"),
        read_at: row.get("read_at"),
        created_at: row.get("created_at"),
    })
}

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, title, message, kind, related_id, priority, is_read, read_at, created_at";

impl NotificationCenter {
    pub fn new(db: PgPool, registry: RoomRegistry) -> Self {
        Self { db, registry }
    }

    /// Persist a notification, then push it to the recipient's user room.
    pub async fn create(&self, req: CreateNotification) -> AppResult<Notification> {
        if req.title.trim().is_empty() {
            return Err(AppError::Validation(
                "notification title must not be empty".to_string(),
            ));
        }

        let row = sqlx::query(&format!(
            "INSERT INTO notifications (id, user_id, title, message, kind, related_id, priority)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(req.user_id)
        .bind(&req.title)
        .bind(&req.message)
        .bind(req.kind.as_str())
        .bind(req.related_id)
        .bind(req.priority.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("create notification: {e}")))?;

        let notification = notification_from_row(&row)?;

        tracing::info!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            kind = notification.kind.as_str(),
            "created notification"
        );

        self.registry
            .emit_to_user(
                notification.user_id,
                &WsOutboundEvent::NewNotification {
                    notification: notification.clone(),
                },
            )
            .await;

        Ok(notification)
    }

    pub async fn get(&self, notification_id: Uuid) -> AppResult<Notification> {
        let row = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1"
        ))
        .bind(notification_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("get notification: {e}")))?;

        match row {
            Some(row) => notification_from_row(&row),
            None => Err(AppError::NotFound("notification")),
        }
    }

    /// Mark a notification read.
    ///
    /// Marking an already-read notification again is a no-op success; only a
    /// missing id is an error. The push fires only when state actually
    /// changed.
    pub async fn mark_read(&self, notification_id: Uuid) -> AppResult<Notification> {
        let existing = self.get(notification_id).await?;
        if existing.is_read {
            return Ok(existing);
        }

        let row = sqlx::query(&format!(
            "UPDATE notifications
             SET is_read = TRUE, read_at = NOW()
             WHERE id = $1
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(notification_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("mark notification read: {e}")))?;

        let notification = notification_from_row(&row)?;

        self.registry
            .emit_to_user(
                notification.user_id,
                &WsOutboundEvent::NotificationRead { notification_id },
            )
            .await;

        Ok(notification)
    }

    /// Mark every unread notification of a user read; returns how many changed.
    pub async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications
             SET is_read = TRUE, read_at = NOW()
             WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("mark all read: {e}")))?;

        let updated = result.rows_affected();

        self.registry
            .emit_to_user(
                user_id,
                &WsOutboundEvent::AllNotificationsRead { user_id, updated },
            )
            .await;

        Ok(updated)
    }

    pub async fn delete(&self, notification_id: Uuid) -> AppResult<()> {
        let row = sqlx::query("DELETE FROM notifications WHERE id = $1 RETURNING user_id")
            .bind(notification_id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::Database(format!("delete notification: {e}")))?;

        let user_id: Uuid = match row {
            Some(row) => row.get("user_id"),
            None => return Err(AppError::NotFound("notification")),
        };

        self.registry
            .emit_to_user(
                user_id,
                &WsOutboundEvent::NotificationDeleted { notification_id },
            )
            .await;

        Ok(())
    }

    pub async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS unread FROM notifications
             WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("unread_count: {e}")))?;

        Ok(row.get("unread"))
    }

    /// List a user's notifications, newest first.
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT 100"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("list notifications: {e}")))?;

        rows.iter().map(notification_from_row).collect()
    }
}
