use crate::error::{AppError, AppResult};
use crate::models::{CreateNotification, Message, MessageStatus, NotificationKind};
use crate::services::{ConversationStore, NotificationCenter};
use crate::websocket::{RoomKey, RoomRegistry, WsOutboundEvent};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use uuid::Uuid;

/// Validates, persists and delivers chat messages.
///
/// Persist-then-attempt-notify is the documented contract here: once the
/// message row and the receiver's notification are durable the send has
/// succeeded, and neither the conversation-summary update nor the room push
/// can fail it.
pub struct MessagePipeline {
    db: PgPool,
    registry: RoomRegistry,
    conversations: Arc<ConversationStore>,
    notifications: Arc<NotificationCenter>,
}

fn message_from_row(row: &PgRow) -> AppResult<Message> {
    let status_str: String = row.get("status");

    Ok(Message {
        id: row.get("id"),
        conversation_id: row.get("conversation_id"),
        sender_id: row.get("sender_id"),
        receiver_id: row.get("receiver_id"),
        content: row.get("content"),
        status: MessageStatus::parse(&status_str)
            .ok_or_else(|| AppError::Database(format!("unknown message status: {status_str}")))?,
        created_at: row.get("created_at"),
        edited_at: row.get("edited_at"),
    })
}

const MESSAGE_COLUMNS: &str =
    "id, conversation_id, sender_id, receiver_id, content, status, created_at, edited_at";

impl MessagePipeline {
    pub fn new(
        db: PgPool,
        registry: RoomRegistry,
        conversations: Arc<ConversationStore>,
        notifications: Arc<NotificationCenter>,
    ) -> Self {
        Self {
            db,
            registry,
            conversations,
            notifications,
        }
    }

    /// Send a message into a conversation.
    ///
    /// Both sender and receiver must be members of the conversation; this is
    /// what stops message injection into a chat the caller is not party to.
    pub async fn send(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        receiver_id: Uuid,
        text: &str,
    ) -> AppResult<Message> {
        if text.trim().is_empty() {
            return Err(AppError::Validation(
                "message text must not be empty".to_string(),
            ));
        }
        if sender_id == receiver_id {
            return Err(AppError::Validation(
                "sender and receiver must differ".to_string(),
            ));
        }

        let conversation = self.conversations.get(conversation_id).await?;
        if !conversation.has_member(sender_id) || !conversation.has_member(receiver_id) {
            return Err(AppError::Forbidden);
        }

        let row = sqlx::query(&format!(
            "INSERT INTO messages (id, conversation_id, sender_id, receiver_id, content, status)
             VALUES ($1, $2, $3, $4, $5, 'sent')
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(conversation_id)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(text)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("insert message: {e}")))?;

        let message = message_from_row(&row)?;

        // Summary update is best-effort; the message row is already durable.
        if let Err(e) = self
            .conversations
            .touch_last_message(conversation_id, text, message.created_at)
            .await
        {
            tracing::warn!(
                conversation_id = %conversation_id,
                error = %e,
                "failed to update conversation summary"
            );
        }

        self.notifications
            .create(CreateNotification {
                user_id: receiver_id,
                title: "New message".to_string(),
                message: text.to_string(),
                kind: NotificationKind::ChatMessage,
                related_id: Some(message.id),
                priority: crate::models::NotificationPriority::Normal,
            })
            .await?;

        let delivered = self
            .registry
            .emit_to_room(
                RoomKey::Conversation(conversation_id),
                &WsOutboundEvent::ReceiveMessage {
                    message: message.clone(),
                },
            )
            .await;
        tracing::debug!(
            message_id = %message.id,
            conversation_id = %conversation_id,
            delivered,
            "message pushed to room"
        );

        Ok(message)
    }

    pub async fn get(&self, message_id: Uuid) -> AppResult<Message> {
        let row = sqlx::query(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"
        ))
        .bind(message_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("get message: {e}")))?;

        match row {
            Some(row) => message_from_row(&row),
            None => Err(AppError::NotFound("message")),
        }
    }

    /// Advance a message's delivery status.
    ///
    /// Only the immediate forward step is legal; the guarded update means a
    /// concurrent transition loses cleanly instead of double-writing, and a
    /// rejected transition leaves the row untouched.
    pub async fn update_status(
        &self,
        message_id: Uuid,
        status: MessageStatus,
    ) -> AppResult<Message> {
        let message = self.get(message_id).await?;

        if !message.status.can_advance_to(status) {
            return Err(AppError::InvalidState {
                entity: "message",
                from: message.status.as_str().to_string(),
                to: status.as_str().to_string(),
            });
        }

        let row = sqlx::query(&format!(
            "UPDATE messages
             SET status = $2
             WHERE id = $1 AND status = $3
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(message_id)
        .bind(status.as_str())
        .bind(message.status.as_str())
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("update message status: {e}")))?;

        let updated = match row {
            Some(row) => message_from_row(&row)?,
            // Lost a race against another transition on the same row.
            None => {
                return Err(AppError::InvalidState {
                    entity: "message",
                    from: message.status.as_str().to_string(),
                    to: status.as_str().to_string(),
                })
            }
        };

        self.registry
            .emit_to_room(
                RoomKey::Conversation(updated.conversation_id),
                &WsOutboundEvent::MessageStatusUpdate {
                    message_id,
                    status: updated.status,
                },
            )
            .await;

        Ok(updated)
    }

    /// List a conversation's messages in creation order.
    pub async fn list_by_conversation(&self, conversation_id: Uuid) -> AppResult<Vec<Message>> {
        let rows = sqlx::query(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages
             WHERE conversation_id = $1
             ORDER BY created_at ASC"
        ))
        .bind(conversation_id)
        .fetch_all(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("list messages: {e}")))?;

        rows.iter().map(message_from_row).collect()
    }

    /// Edit a message's text. Only the original sender may edit.
    pub async fn edit(&self, message_id: Uuid, editor_id: Uuid, text: &str) -> AppResult<Message> {
        if text.trim().is_empty() {
            return Err(AppError::Validation(
                "message text must not be empty".to_string(),
            ));
        }

        let message = self.get(message_id).await?;
        if message.sender_id != editor_id {
            return Err(AppError::Forbidden);
        }

        let row = sqlx::query(&format!(
            "UPDATE messages
             SET content = $2, edited_at = NOW()
             WHERE id = $1
             RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(message_id)
        .bind(text)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("edit message: {e}")))?;

        message_from_row(&row)
    }

    /// Delete a message. Only the original sender may delete.
    pub async fn delete(&self, message_id: Uuid, requester_id: Uuid) -> AppResult<()> {
        let message = self.get(message_id).await?;
        if message.sender_id != requester_id {
            return Err(AppError::Forbidden);
        }

        sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(message_id)
            .execute(&self.db)
            .await
            .map_err(|e| AppError::Database(format!("delete message: {e}")))?;

        Ok(())
    }
}
