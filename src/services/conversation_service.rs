use crate::directory::UserDirectory;
use crate::error::{AppError, AppResult};
use crate::models::{canonical_pair, Conversation};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use uuid::Uuid;

/// Owns conversation records and the two-party uniqueness invariant.
///
/// The member pair is stored canonically ordered with a unique index, so the
/// database is the single serialization point for concurrent creation: both
/// racers insert with `ON CONFLICT DO NOTHING` and re-select the winner.
pub struct ConversationStore {
    db: PgPool,
    directory: Arc<dyn UserDirectory>,
}

fn conversation_from_row(row: &PgRow) -> Conversation {
    Conversation {
        id: row.get("id"),
        member_a: row.get("member_a"),
        member_b: row.get("member_b"),
        last_message: row.get("last_message"),
        last_message_at: row.get("last_message_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const CONVERSATION_COLUMNS: &str =
    "id, member_a, member_b, last_message, last_message_at, created_at, updated_at";

impl ConversationStore {
    pub fn new(db: PgPool, directory: Arc<dyn UserDirectory>) -> Self {
        Self { db, directory }
    }

    /// Get the conversation between two users, creating it on first contact.
    ///
    /// Idempotent under concurrent calls: N simultaneous requests for the
    /// same unordered pair yield exactly one row, and the argument order
    /// never matters.
    pub async fn get_or_create(&self, user_a: Uuid, user_b: Uuid) -> AppResult<Conversation> {
        if user_a == user_b {
            return Err(AppError::Validation(
                "a conversation needs two distinct members".to_string(),
            ));
        }

        for user_id in [user_a, user_b] {
            if !self.directory.user_exists(user_id).await? {
                return Err(AppError::Validation(format!(
                    "user {user_id} does not exist"
                )));
            }
        }

        let (member_a, member_b) = canonical_pair(user_a, user_b);

        sqlx::query(
            "INSERT INTO conversations (id, member_a, member_b)
             VALUES ($1, $2, $3)
             ON CONFLICT (member_a, member_b) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(member_a)
        .bind(member_b)
        .execute(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("insert conversation: {e}")))?;

        let row = sqlx::query(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations
             WHERE member_a = $1 AND member_b = $2"
        ))
        .bind(member_a)
        .bind(member_b)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("select conversation: {e}")))?;

        Ok(conversation_from_row(&row))
    }

    /// Find the conversation for an unordered member pair, if any.
    pub async fn find_by_members(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> AppResult<Option<Conversation>> {
        let (member_a, member_b) = canonical_pair(user_a, user_b);

        let row = sqlx::query(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations
             WHERE member_a = $1 AND member_b = $2"
        ))
        .bind(member_a)
        .bind(member_b)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("find_by_members: {e}")))?;

        Ok(row.as_ref().map(conversation_from_row))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Conversation> {
        let row = sqlx::query(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("get conversation: {e}")))?;

        row.as_ref()
            .map(conversation_from_row)
            .ok_or(AppError::NotFound("conversation"))
    }

    /// List a user's conversations, most recently active first.
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        let rows = sqlx::query(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations
             WHERE member_a = $1 OR member_b = $1
             ORDER BY updated_at DESC
             LIMIT 100"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("list conversations: {e}")))?;

        Ok(rows.iter().map(conversation_from_row).collect())
    }

    pub async fn is_member(&self, conversation_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let row = sqlx::query(
            "SELECT 1 FROM conversations
             WHERE id = $1 AND (member_a = $2 OR member_b = $2)",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("is_member: {e}")))?;

        Ok(row.is_some())
    }

    /// Refresh the summary fields after a message was persisted.
    ///
    /// Callers treat a failure here as non-fatal: the message row is already
    /// durable and the summary catches up on the next send.
    pub async fn touch_last_message(
        &self,
        conversation_id: Uuid,
        text: &str,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE conversations
             SET last_message = $2, last_message_at = $3, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(conversation_id)
        .bind(text)
        .bind(at)
        .execute(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("touch_last_message: {e}")))?;

        Ok(())
    }

    /// Patch summary fields explicitly (admin surface).
    pub async fn update(
        &self,
        conversation_id: Uuid,
        last_message: Option<String>,
    ) -> AppResult<Conversation> {
        let row = sqlx::query(&format!(
            "UPDATE conversations
             SET last_message = COALESCE($2, last_message),
                 last_message_at = CASE WHEN $2 IS NULL THEN last_message_at ELSE NOW() END,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {CONVERSATION_COLUMNS}"
        ))
        .bind(conversation_id)
        .bind(last_message)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::Database(format!("update conversation: {e}")))?;

        row.as_ref()
            .map(conversation_from_row)
            .ok_or(AppError::NotFound("conversation"))
    }

    /// Remove a conversation (explicit admin action).
    ///
    /// Messages are deliberately left in place; the conversation row going
    /// away orphans its history rather than destroying it.
    pub async fn delete(&self, conversation_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(conversation_id)
            .execute(&self.db)
            .await
            .map_err(|e| AppError::Database(format!("delete conversation: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("conversation"));
        }

        Ok(())
    }
}
