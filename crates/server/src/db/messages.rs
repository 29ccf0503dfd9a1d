//! Private message repository.

use sqlx::PgPool;

use wayfarer_core::UserId;

use super::{RepositoryError, not_found_on_foreign_key};
use crate::models::social::Message;

/// Messages returned per conversation.
pub const CONVERSATION_LIMIT: i64 = 200;

/// Repository for private messages.
pub struct MessageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MessageRepository<'a> {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The most recent messages between two users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn conversation(
        &self,
        user: UserId,
        other: UserId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let messages = sqlx::query_as::<_, Message>(
            r"
            SELECT * FROM (
                SELECT id, sender_id, recipient_id, content, is_read, sent_at
                FROM wayfarer.message
                WHERE (sender_id = $1 AND recipient_id = $2)
                   OR (sender_id = $2 AND recipient_id = $1)
                ORDER BY sent_at DESC, id DESC
                LIMIT $3
            ) recent
            ORDER BY sent_at, id
            ",
        )
        .bind(user)
        .bind(other)
        .bind(CONVERSATION_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(messages)
    }

    /// Send a private message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the recipient does not exist.
    pub async fn send(
        &self,
        sender: UserId,
        recipient: UserId,
        content: &str,
    ) -> Result<Message, RepositoryError> {
        sqlx::query_as::<_, Message>(
            r"
            INSERT INTO wayfarer.message (sender_id, recipient_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, sender_id, recipient_id, content, is_read, sent_at
            ",
        )
        .bind(sender)
        .bind(recipient)
        .bind(content)
        .fetch_one(self.pool)
        .await
        .map_err(not_found_on_foreign_key)
    }

    /// Mark everything `sender` sent to `reader` as read. Returns the number
    /// of messages that changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_read(&self, reader: UserId, sender: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE wayfarer.message
            SET is_read = TRUE
            WHERE recipient_id = $1 AND sender_id = $2 AND NOT is_read
            ",
        )
        .bind(reader)
        .bind(sender)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Number of unread messages addressed to `user`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unread_count(&self, user: UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM wayfarer.message WHERE recipient_id = $1 AND NOT is_read",
        )
        .bind(user)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
