//! Trip group chat repository.

use sqlx::PgPool;

use wayfarer_core::{TripId, UserId};

use super::RepositoryError;
use crate::models::social::TripMessage;

/// Messages returned per page of group chat history.
pub const HISTORY_LIMIT: i64 = 200;

/// Repository for trip group chat.
pub struct TripChatRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TripChatRepository<'a> {
    /// Create a new trip chat repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The most recent messages of a trip's chat, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn history(&self, trip_id: TripId) -> Result<Vec<TripMessage>, RepositoryError> {
        let messages = sqlx::query_as::<_, TripMessage>(
            r"
            SELECT * FROM (
                SELECT m.id, m.trip_id, m.sender_id, u.display_name AS sender_name,
                       m.content, m.sent_at
                FROM wayfarer.trip_message m
                JOIN wayfarer.user u ON u.id = m.sender_id
                WHERE m.trip_id = $1
                ORDER BY m.sent_at DESC, m.id DESC
                LIMIT $2
            ) recent
            ORDER BY sent_at, id
            ",
        )
        .bind(trip_id)
        .bind(HISTORY_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(messages)
    }

    /// Post a message to a trip's chat.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn post(
        &self,
        trip_id: TripId,
        sender: UserId,
        content: &str,
    ) -> Result<TripMessage, RepositoryError> {
        let message = sqlx::query_as::<_, TripMessage>(
            r"
            WITH inserted AS (
                INSERT INTO wayfarer.trip_message (trip_id, sender_id, content)
                VALUES ($1, $2, $3)
                RETURNING id, trip_id, sender_id, content, sent_at
            )
            SELECT i.id, i.trip_id, i.sender_id, u.display_name AS sender_name,
                   i.content, i.sent_at
            FROM inserted i
            JOIN wayfarer.user u ON u.id = i.sender_id
            ",
        )
        .bind(trip_id)
        .bind(sender)
        .bind(content)
        .fetch_one(self.pool)
        .await
        .map_err(super::not_found_on_foreign_key)?;

        Ok(message)
    }
}
