//! Trip roster repository.
//!
//! Reads go through the pool. Writes are associated functions on a
//! connection: every roster change runs inside a transaction that holds the
//! trip row lock (see [`crate::services::membership`]).

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use wayfarer_core::membership::RosterEntry;
use wayfarer_core::{MemberRole, MemberStatus, TripId, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::trip::TripMember;

#[derive(Debug, sqlx::FromRow)]
struct RosterRow {
    user_id: UserId,
    role: MemberRole,
    status: MemberStatus,
    joined_at: DateTime<Utc>,
}

impl From<RosterRow> for RosterEntry {
    fn from(row: RosterRow) -> Self {
        Self {
            user_id: row.user_id,
            role: row.role,
            status: row.status,
            joined_at: row.joined_at,
        }
    }
}

/// A user's standing on one trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct Membership {
    pub role: MemberRole,
    pub status: MemberStatus,
}

impl Membership {
    /// Whether the invitation has been accepted.
    #[must_use]
    pub fn is_accepted(self) -> bool {
        self.status == MemberStatus::Accepted
    }

    /// Whether this is the trip's owner.
    #[must_use]
    pub fn is_owner(self) -> bool {
        self.role == MemberRole::Owner && self.is_accepted()
    }
}

/// Repository for trip membership.
pub struct MemberRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MemberRepository<'a> {
    /// Create a new member repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's role and status on a trip, if they have a row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn membership(
        &self,
        trip_id: TripId,
        user_id: UserId,
    ) -> Result<Option<Membership>, RepositoryError> {
        let membership = sqlx::query_as::<_, Membership>(
            "SELECT role, status FROM wayfarer.trip_member WHERE trip_id = $1 AND user_id = $2",
        )
        .bind(trip_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(membership)
    }

    /// The roster with names, owner first, then in join order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, trip_id: TripId) -> Result<Vec<TripMember>, RepositoryError> {
        let members = sqlx::query_as::<_, TripMember>(
            r"
            SELECT m.trip_id, m.user_id, u.display_name, u.avatar_url, m.role, m.status,
                   m.joined_at
            FROM wayfarer.trip_member m
            JOIN wayfarer.user u ON u.id = m.user_id
            WHERE m.trip_id = $1
            ORDER BY (m.role = 'owner') DESC, m.joined_at, m.user_id
            ",
        )
        .bind(trip_id)
        .fetch_all(self.pool)
        .await?;

        Ok(members)
    }

    // =========================================================================
    // Transactional steps
    // =========================================================================

    /// The roster as the membership rules see it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn roster(
        conn: &mut PgConnection,
        trip_id: TripId,
    ) -> Result<Vec<RosterEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, RosterRow>(
            r"
            SELECT user_id, role, status, joined_at
            FROM wayfarer.trip_member
            WHERE trip_id = $1
            ORDER BY joined_at, user_id
            ",
        )
        .bind(trip_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(RosterEntry::from).collect())
    }

    /// Trips the user has any row on.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn trips_of(
        conn: &mut PgConnection,
        user_id: UserId,
    ) -> Result<Vec<TripId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, TripId>(
            "SELECT trip_id FROM wayfarer.trip_member WHERE user_id = $1 ORDER BY trip_id",
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(ids)
    }

    /// Add a pending invitation, returning its join time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has a row.
    pub async fn insert_pending(
        conn: &mut PgConnection,
        trip_id: TripId,
        user_id: UserId,
    ) -> Result<DateTime<Utc>, RepositoryError> {
        sqlx::query_scalar::<_, DateTime<Utc>>(
            r"
            INSERT INTO wayfarer.trip_member (trip_id, user_id, role, status)
            VALUES ($1, $2, 'member', 'pending')
            RETURNING joined_at
            ",
        )
        .bind(trip_id)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| conflict_on_unique(e, "user is already on this trip"))
    }

    /// Flip a pending row to accepted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no pending row exists.
    pub async fn accept(
        conn: &mut PgConnection,
        trip_id: TripId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE wayfarer.trip_member
            SET status = 'accepted'
            WHERE trip_id = $1 AND user_id = $2 AND status = 'pending'
            ",
        )
        .bind(trip_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a member's row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if there was no row.
    pub async fn delete(
        conn: &mut PgConnection,
        trip_id: TripId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM wayfarer.trip_member WHERE trip_id = $1 AND user_id = $2")
                .bind(trip_id)
                .bind(user_id)
                .execute(&mut *conn)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Make an accepted member the trip's owner.
    ///
    /// The previous owner's row must already be gone or demoted, or the
    /// single-owner index rejects the update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the heir has no accepted row.
    pub async fn promote(
        conn: &mut PgConnection,
        trip_id: TripId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE wayfarer.trip_member
            SET role = 'owner'
            WHERE trip_id = $1 AND user_id = $2 AND status = 'accepted'
            ",
        )
        .bind(trip_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| conflict_on_unique(e, "trip already has an owner"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
