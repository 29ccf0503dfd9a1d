//! Dashboard statistics and account removal for administrators.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use wayfarer_core::UserId;

use super::RepositoryError;

/// Site-wide counts for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct SiteStats {
    pub users: i64,
    pub admins: i64,
    pub trips: i64,
    pub activities: i64,
    pub expenses: i64,
    /// Sum of every expense amount.
    #[serde(with = "rust_decimal::serde::str")]
    pub expense_total: Decimal,
    pub memories: i64,
    pub messages: i64,
}

/// Repository for admin-only queries.
pub struct AdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Gather the dashboard counts in one round trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<SiteStats, RepositoryError> {
        let stats = sqlx::query_as::<_, SiteStats>(
            r"
            SELECT
                (SELECT COUNT(*) FROM wayfarer.user) AS users,
                (SELECT COUNT(*) FROM wayfarer.user WHERE role = 'admin') AS admins,
                (SELECT COUNT(*) FROM wayfarer.trip) AS trips,
                (SELECT COUNT(*) FROM wayfarer.activity) AS activities,
                (SELECT COUNT(*) FROM wayfarer.expense) AS expenses,
                (SELECT COALESCE(SUM(amount), 0)::NUMERIC(14, 2) FROM wayfarer.expense)
                    AS expense_total,
                (SELECT COUNT(*) FROM wayfarer.memory) AS memories,
                (SELECT COUNT(*) FROM wayfarer.message)
                    + (SELECT COUNT(*) FROM wayfarer.trip_message) AS messages
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }

    /// Delete an account. The user must no longer be on any trip; rows the
    /// user authored elsewhere go with it through foreign key cascades.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn delete_user(conn: &mut PgConnection, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM wayfarer.user WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
