//! Activity repository for database operations.

use sqlx::PgPool;

use wayfarer_core::{ActivityId, TripId, UserId};

use super::RepositoryError;
use crate::models::activity::{Activity, ActivityDetails};

/// Repository for itinerary activities.
pub struct ActivityRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ActivityRepository<'a> {
    /// Create a new activity repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an activity by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ActivityId) -> Result<Option<Activity>, RepositoryError> {
        let activity = sqlx::query_as::<_, Activity>(
            r"
            SELECT id, trip_id, title, starts_at, ends_at, created_by, location, created_at
            FROM wayfarer.activity
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(activity)
    }

    /// A trip's itinerary in chronological order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_trip(&self, trip_id: TripId) -> Result<Vec<Activity>, RepositoryError> {
        let activities = sqlx::query_as::<_, Activity>(
            r"
            SELECT id, trip_id, title, starts_at, ends_at, created_by, location, created_at
            FROM wayfarer.activity
            WHERE trip_id = $1
            ORDER BY starts_at, id
            ",
        )
        .bind(trip_id)
        .fetch_all(self.pool)
        .await?;

        Ok(activities)
    }

    /// Add an activity to a trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        trip_id: TripId,
        created_by: UserId,
        details: &ActivityDetails,
    ) -> Result<Activity, RepositoryError> {
        let activity = sqlx::query_as::<_, Activity>(
            r"
            INSERT INTO wayfarer.activity (trip_id, title, starts_at, ends_at, created_by, location)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, trip_id, title, starts_at, ends_at, created_by, location, created_at
            ",
        )
        .bind(trip_id)
        .bind(&details.title)
        .bind(details.starts_at)
        .bind(details.ends_at)
        .bind(created_by)
        .bind(details.location.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(super::not_found_on_foreign_key)?;

        Ok(activity)
    }

    /// Replace an activity's details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the activity does not exist.
    pub async fn update(
        &self,
        id: ActivityId,
        details: &ActivityDetails,
    ) -> Result<Activity, RepositoryError> {
        sqlx::query_as::<_, Activity>(
            r"
            UPDATE wayfarer.activity
            SET title = $2, starts_at = $3, ends_at = $4, location = $5
            WHERE id = $1
            RETURNING id, trip_id, title, starts_at, ends_at, created_by, location, created_at
            ",
        )
        .bind(id)
        .bind(&details.title)
        .bind(details.starts_at)
        .bind(details.ends_at)
        .bind(details.location.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete an activity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the activity does not exist.
    pub async fn delete(&self, id: ActivityId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM wayfarer.activity WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
