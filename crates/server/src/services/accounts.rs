//! Account removal by an administrator.

use sqlx::PgPool;

use wayfarer_core::UserId;

use super::ServiceError;
use super::membership::{begin_roster_tx, depart_all_trips};
use crate::db::{AdminRepository, RepositoryError};

/// Service for administrator account actions.
pub struct AccountService<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Delete `target`'s account.
    ///
    /// The user first leaves every trip with the usual succession rules, so
    /// trips they owned pass to the next member or are dissolved. Everything
    /// happens in one transaction.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Invalid` if an administrator targets themselves.
    /// - `RepositoryError::NotFound` if the user does not exist.
    pub async fn delete_user(&self, actor: UserId, target: UserId) -> Result<(), ServiceError> {
        if actor == target {
            return Err(ServiceError::Invalid(
                "administrators cannot delete their own account".to_string(),
            ));
        }

        let mut tx = begin_roster_tx(self.pool).await?;
        let departures = depart_all_trips(&mut tx, target).await?;
        AdminRepository::delete_user(&mut tx, target).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            %actor,
            %target,
            trips_left = departures.len(),
            "User account deleted"
        );
        Ok(())
    }
}
