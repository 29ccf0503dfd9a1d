//! Friend request repository.
//!
//! Friendship is not stored separately: two users are friends when an
//! accepted request exists between them in either direction.

use sqlx::PgPool;

use wayfarer_core::{FriendRequestId, UserId};

use super::{RepositoryError, conflict_on_unique, not_found_on_foreign_key};
use crate::models::UserSummary;
use crate::models::social::{FriendRequest, IncomingRequest};

/// Repository for friend requests and friendships.
pub struct FriendRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FriendRepository<'a> {
    /// Create a new friend repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Send a friend request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if any request already exists
    /// between the pair, or `RepositoryError::NotFound` if `to` does not exist.
    pub async fn send_request(
        &self,
        from: UserId,
        to: UserId,
    ) -> Result<FriendRequest, RepositoryError> {
        sqlx::query_as::<_, FriendRequest>(
            r"
            INSERT INTO wayfarer.friend_request (from_user, to_user)
            VALUES ($1, $2)
            RETURNING id, from_user, to_user, status, created_at
            ",
        )
        .bind(from)
        .bind(to)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            let missing_user = matches!(
                &e,
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation()
            );
            if missing_user {
                not_found_on_foreign_key(e)
            } else {
                conflict_on_unique(e, "a friend request already exists")
            }
        })
    }

    /// Pending requests addressed to `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn incoming(&self, user: UserId) -> Result<Vec<IncomingRequest>, RepositoryError> {
        let requests = sqlx::query_as::<_, IncomingRequest>(
            r"
            SELECT r.id, r.from_user, u.display_name AS from_name, r.created_at
            FROM wayfarer.friend_request r
            JOIN wayfarer.user u ON u.id = r.from_user
            WHERE r.to_user = $1 AND r.status = 'pending'
            ORDER BY r.created_at DESC, r.id DESC
            ",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(requests)
    }

    /// Accept a pending request addressed to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such pending request exists.
    pub async fn accept(
        &self,
        id: FriendRequestId,
        recipient: UserId,
    ) -> Result<FriendRequest, RepositoryError> {
        sqlx::query_as::<_, FriendRequest>(
            r"
            UPDATE wayfarer.friend_request
            SET status = 'accepted'
            WHERE id = $1 AND to_user = $2 AND status = 'pending'
            RETURNING id, from_user, to_user, status, created_at
            ",
        )
        .bind(id)
        .bind(recipient)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Decline (delete) a pending request addressed to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such pending request exists.
    pub async fn decline(
        &self,
        id: FriendRequestId,
        recipient: UserId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM wayfarer.friend_request
            WHERE id = $1 AND to_user = $2 AND status = 'pending'
            ",
        )
        .bind(id)
        .bind(recipient)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// The user's friends, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn friends(&self, user: UserId) -> Result<Vec<UserSummary>, RepositoryError> {
        let friends = sqlx::query_as::<_, UserSummary>(
            r"
            SELECT u.id, u.display_name, u.avatar_url
            FROM wayfarer.friend_request r
            JOIN wayfarer.user u
              ON u.id = CASE WHEN r.from_user = $1 THEN r.to_user ELSE r.from_user END
            WHERE (r.from_user = $1 OR r.to_user = $1) AND r.status = 'accepted'
            ORDER BY u.display_name, u.id
            ",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(friends)
    }

    /// Whether the two users are friends.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn are_friends(&self, a: UserId, b: UserId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM wayfarer.friend_request
                WHERE status = 'accepted'
                  AND ((from_user = $1 AND to_user = $2) OR (from_user = $2 AND to_user = $1))
            )
            ",
        )
        .bind(a)
        .bind(b)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// End a friendship.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the users are not friends.
    pub async fn remove(&self, user: UserId, friend: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM wayfarer.friend_request
            WHERE status = 'accepted'
              AND ((from_user = $1 AND to_user = $2) OR (from_user = $2 AND to_user = $1))
            ",
        )
        .bind(user)
        .bind(friend)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
