//! Memory repository for database operations.

use sqlx::PgPool;

use wayfarer_core::{MemoryId, TripId, UserId};

use super::RepositoryError;
use crate::models::memory::{Memory, NewMemory};

/// Repository for trip memories.
pub struct MemoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MemoryRepository<'a> {
    /// Create a new memory repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a memory by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: MemoryId) -> Result<Option<Memory>, RepositoryError> {
        let memory = sqlx::query_as::<_, Memory>(
            r"
            SELECT m.id, m.trip_id, m.user_id, u.display_name AS author_name, m.kind,
                   m.description, m.media_url, m.created_at
            FROM wayfarer.memory m
            JOIN wayfarer.user u ON u.id = m.user_id
            WHERE m.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(memory)
    }

    /// A trip's memories, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_trip(&self, trip_id: TripId) -> Result<Vec<Memory>, RepositoryError> {
        let memories = sqlx::query_as::<_, Memory>(
            r"
            SELECT m.id, m.trip_id, m.user_id, u.display_name AS author_name, m.kind,
                   m.description, m.media_url, m.created_at
            FROM wayfarer.memory m
            JOIN wayfarer.user u ON u.id = m.user_id
            WHERE m.trip_id = $1
            ORDER BY m.created_at DESC, m.id DESC
            ",
        )
        .bind(trip_id)
        .fetch_all(self.pool)
        .await?;

        Ok(memories)
    }

    /// Attach a memory to a trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        trip_id: TripId,
        author: UserId,
        memory: &NewMemory,
    ) -> Result<Memory, RepositoryError> {
        let created = sqlx::query_as::<_, Memory>(
            r"
            WITH inserted AS (
                INSERT INTO wayfarer.memory (trip_id, user_id, kind, description, media_url)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, trip_id, user_id, kind, description, media_url, created_at
            )
            SELECT i.id, i.trip_id, i.user_id, u.display_name AS author_name, i.kind,
                   i.description, i.media_url, i.created_at
            FROM inserted i
            JOIN wayfarer.user u ON u.id = i.user_id
            ",
        )
        .bind(trip_id)
        .bind(author)
        .bind(memory.kind)
        .bind(memory.description.as_deref())
        .bind(memory.media_url.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(super::not_found_on_foreign_key)?;

        Ok(created)
    }

    /// Delete a memory.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the memory does not exist.
    pub async fn delete(&self, id: MemoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM wayfarer.memory WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
