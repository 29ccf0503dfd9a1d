//! Trip repository for database operations.

use sqlx::{PgConnection, PgPool};

use wayfarer_core::{TripId, UserId};

use super::RepositoryError;
use crate::models::trip::{Trip, TripDetails};

/// Row lock taken on a trip before touching its roster or splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripLock {
    /// `FOR UPDATE`: serializes roster changes on one trip.
    Update,
    /// `FOR SHARE`: blocks roster changes while an expense is split.
    Share,
}

/// Rows removed when a trip is dissolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub activities: u64,
    pub expense_splits: u64,
    pub expenses: u64,
    pub memories: u64,
    pub messages: u64,
    pub members: u64,
}

/// Repository for trip database operations.
pub struct TripRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TripRepository<'a> {
    /// Create a new trip repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a trip by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: TripId) -> Result<Option<Trip>, RepositoryError> {
        let trip = sqlx::query_as::<_, Trip>(
            r"
            SELECT id, name, destination, origin, start_date, end_date, created_by,
                   image_url, created_at
            FROM wayfarer.trip
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(trip)
    }

    /// Trips on which the user is an accepted member, soonest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Trip>, RepositoryError> {
        let trips = sqlx::query_as::<_, Trip>(
            r"
            SELECT t.id, t.name, t.destination, t.origin, t.start_date, t.end_date,
                   t.created_by, t.image_url, t.created_at
            FROM wayfarer.trip t
            JOIN wayfarer.trip_member m ON m.trip_id = t.id
            WHERE m.user_id = $1 AND m.status = 'accepted'
            ORDER BY t.start_date, t.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(trips)
    }

    /// Trips to which the user has a pending invitation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_invitations(&self, user_id: UserId) -> Result<Vec<Trip>, RepositoryError> {
        let trips = sqlx::query_as::<_, Trip>(
            r"
            SELECT t.id, t.name, t.destination, t.origin, t.start_date, t.end_date,
                   t.created_by, t.image_url, t.created_at
            FROM wayfarer.trip t
            JOIN wayfarer.trip_member m ON m.trip_id = t.id
            WHERE m.user_id = $1 AND m.status = 'pending'
            ORDER BY m.joined_at DESC, t.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(trips)
    }

    /// Create a trip with `owner` as its accepted owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either insert fails; nothing
    /// is written in that case.
    pub async fn create(
        &self,
        owner: UserId,
        details: &TripDetails,
    ) -> Result<Trip, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let trip = sqlx::query_as::<_, Trip>(
            r"
            INSERT INTO wayfarer.trip
                (name, destination, origin, start_date, end_date, created_by, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, destination, origin, start_date, end_date, created_by,
                      image_url, created_at
            ",
        )
        .bind(&details.name)
        .bind(&details.destination)
        .bind(details.origin.as_deref())
        .bind(details.start_date)
        .bind(details.end_date)
        .bind(owner)
        .bind(details.image_url.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO wayfarer.trip_member (trip_id, user_id, role, status)
            VALUES ($1, $2, 'owner', 'accepted')
            ",
        )
        .bind(trip.id)
        .bind(owner)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(trip)
    }

    /// Replace a trip's details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the trip does not exist.
    pub async fn update(&self, id: TripId, details: &TripDetails) -> Result<Trip, RepositoryError> {
        sqlx::query_as::<_, Trip>(
            r"
            UPDATE wayfarer.trip
            SET name = $2, destination = $3, origin = $4, start_date = $5, end_date = $6,
                image_url = $7
            WHERE id = $1
            RETURNING id, name, destination, origin, start_date, end_date, created_by,
                      image_url, created_at
            ",
        )
        .bind(id)
        .bind(&details.name)
        .bind(&details.destination)
        .bind(details.origin.as_deref())
        .bind(details.start_date)
        .bind(details.end_date)
        .bind(details.image_url.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    // =========================================================================
    // Transactional steps
    // =========================================================================

    /// Lock the trip row, returning it, or `None` if the trip does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock(
        conn: &mut PgConnection,
        id: TripId,
        lock: TripLock,
    ) -> Result<Option<Trip>, RepositoryError> {
        let sql = match lock {
            TripLock::Update => {
                r"
                SELECT id, name, destination, origin, start_date, end_date, created_by,
                       image_url, created_at
                FROM wayfarer.trip
                WHERE id = $1
                FOR UPDATE
                "
            }
            TripLock::Share => {
                r"
                SELECT id, name, destination, origin, start_date, end_date, created_by,
                       image_url, created_at
                FROM wayfarer.trip
                WHERE id = $1
                FOR SHARE
                "
            }
        };

        let trip = sqlx::query_as::<_, Trip>(sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(trip)
    }

    /// Point the trip's `created_by` at its new owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the trip does not exist.
    pub async fn set_creator(
        conn: &mut PgConnection,
        id: TripId,
        owner: UserId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE wayfarer.trip SET created_by = $2 WHERE id = $1")
            .bind(id)
            .bind(owner)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a trip and everything scoped to it.
    ///
    /// Children go first, in dependency order, then the trip row. Must run
    /// inside the caller's transaction so a failure leaves nothing half-deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the trip row was already gone.
    pub async fn delete_cascade(
        conn: &mut PgConnection,
        id: TripId,
    ) -> Result<CascadeSummary, RepositoryError> {
        let activities = sqlx::query("DELETE FROM wayfarer.activity WHERE trip_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        let expense_splits = sqlx::query(
            r"
            DELETE FROM wayfarer.expense_split s
            USING wayfarer.expense e
            WHERE s.expense_id = e.id AND e.trip_id = $1
            ",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

        let expenses = sqlx::query("DELETE FROM wayfarer.expense WHERE trip_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        let memories = sqlx::query("DELETE FROM wayfarer.memory WHERE trip_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        let messages = sqlx::query("DELETE FROM wayfarer.trip_message WHERE trip_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        let members = sqlx::query("DELETE FROM wayfarer.trip_member WHERE trip_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM wayfarer.trip WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(CascadeSummary {
            activities,
            expense_splits,
            expenses,
            memories,
            messages,
            members,
        })
    }
}
