//! Expense and split repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use wayfarer_core::balances::Obligation;
use wayfarer_core::{ExpenseId, Money, TripId, UserId};

use super::RepositoryError;
use crate::models::expense::{Expense, ExpenseSplit, ExpenseWithSplits};

fn money(value: Decimal, column: &str) -> Result<Money, RepositoryError> {
    Money::try_from(value).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid {column} in database: {e}"))
    })
}

/// Internal row type for expense queries.
#[derive(Debug, sqlx::FromRow)]
struct ExpenseRow {
    id: ExpenseId,
    trip_id: TripId,
    paid_by: UserId,
    description: String,
    amount: Decimal,
    created_at: DateTime<Utc>,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = RepositoryError;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            trip_id: row.trip_id,
            paid_by: row.paid_by,
            description: row.description,
            amount: money(row.amount, "expense amount")?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ExpenseListRow {
    #[sqlx(flatten)]
    expense: ExpenseRow,
    payer_name: String,
}

/// Internal row type for split queries.
#[derive(Debug, sqlx::FromRow)]
struct SplitRow {
    expense_id: ExpenseId,
    user_id: UserId,
    display_name: String,
    share: Decimal,
    is_paid: bool,
}

impl TryFrom<SplitRow> for ExpenseSplit {
    type Error = RepositoryError;

    fn try_from(row: SplitRow) -> Result<Self, Self::Error> {
        Ok(Self {
            expense_id: row.expense_id,
            user_id: row.user_id,
            display_name: row.display_name,
            share: money(row.share, "split share")?,
            is_paid: row.is_paid,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ObligationRow {
    paid_by: UserId,
    user_id: UserId,
    share: Decimal,
    is_paid: bool,
}

impl TryFrom<ObligationRow> for Obligation {
    type Error = RepositoryError;

    fn try_from(row: ObligationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            payer: row.paid_by,
            debtor: row.user_id,
            share: money(row.share, "split share")?,
            is_paid: row.is_paid,
        })
    }
}

/// Repository for expenses and their splits.
pub struct ExpenseRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ExpenseRepository<'a> {
    /// Create a new expense repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an expense by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ExpenseId) -> Result<Option<Expense>, RepositoryError> {
        let row = sqlx::query_as::<_, ExpenseRow>(
            r"
            SELECT id, trip_id, paid_by, description, amount, created_at
            FROM wayfarer.expense
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Expense::try_from).transpose()
    }

    /// A trip's expenses, newest first, each with its payer's name and splits.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_trip(
        &self,
        trip_id: TripId,
    ) -> Result<Vec<ExpenseWithSplits>, RepositoryError> {
        let rows = sqlx::query_as::<_, ExpenseListRow>(
            r"
            SELECT e.id, e.trip_id, e.paid_by, e.description, e.amount, e.created_at,
                   u.display_name AS payer_name
            FROM wayfarer.expense e
            JOIN wayfarer.user u ON u.id = e.paid_by
            WHERE e.trip_id = $1
            ORDER BY e.created_at DESC, e.id DESC
            ",
        )
        .bind(trip_id)
        .fetch_all(self.pool)
        .await?;

        let split_rows = sqlx::query_as::<_, SplitRow>(
            r"
            SELECT s.expense_id, s.user_id, u.display_name, s.share, s.is_paid
            FROM wayfarer.expense_split s
            JOIN wayfarer.expense e ON e.id = s.expense_id
            JOIN wayfarer.user u ON u.id = s.user_id
            WHERE e.trip_id = $1
            ORDER BY s.expense_id, u.display_name, s.user_id
            ",
        )
        .bind(trip_id)
        .fetch_all(self.pool)
        .await?;

        let mut splits: HashMap<ExpenseId, Vec<ExpenseSplit>> = HashMap::new();
        for row in split_rows {
            let split = ExpenseSplit::try_from(row)?;
            splits.entry(split.expense_id).or_default().push(split);
        }

        rows.into_iter()
            .map(|row| {
                let expense = Expense::try_from(row.expense)?;
                Ok(ExpenseWithSplits {
                    splits: splits.remove(&expense.id).unwrap_or_default(),
                    payer_name: row.payer_name,
                    expense,
                })
            })
            .collect()
    }

    /// Every split on a trip, paired with the expense's payer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn obligations(&self, trip_id: TripId) -> Result<Vec<Obligation>, RepositoryError> {
        let rows = sqlx::query_as::<_, ObligationRow>(
            r"
            SELECT e.paid_by, s.user_id, s.share, s.is_paid
            FROM wayfarer.expense_split s
            JOIN wayfarer.expense e ON e.id = s.expense_id
            WHERE e.trip_id = $1
            ",
        )
        .bind(trip_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Obligation::try_from).collect()
    }

    /// Set the paid flag of one split.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no split exists for the pair.
    pub async fn set_split_paid(
        &self,
        expense_id: ExpenseId,
        user_id: UserId,
        is_paid: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE wayfarer.expense_split
            SET is_paid = $3
            WHERE expense_id = $1 AND user_id = $2
            ",
        )
        .bind(expense_id)
        .bind(user_id)
        .bind(is_paid)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete an expense and its splits.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the expense does not exist.
    pub async fn delete(&self, id: ExpenseId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM wayfarer.expense_split WHERE expense_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM wayfarer.expense WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Transactional steps
    // =========================================================================

    /// Insert an expense row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        conn: &mut PgConnection,
        trip_id: TripId,
        paid_by: UserId,
        description: &str,
        amount: Money,
    ) -> Result<Expense, RepositoryError> {
        let row = sqlx::query_as::<_, ExpenseRow>(
            r"
            INSERT INTO wayfarer.expense (trip_id, paid_by, description, amount)
            VALUES ($1, $2, $3, $4)
            RETURNING id, trip_id, paid_by, description, amount, created_at
            ",
        )
        .bind(trip_id)
        .bind(paid_by)
        .bind(description)
        .bind(amount.amount())
        .fetch_one(&mut *conn)
        .await?;

        Expense::try_from(row)
    }

    /// Insert one unpaid split.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_split(
        conn: &mut PgConnection,
        expense_id: ExpenseId,
        user_id: UserId,
        share: Money,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO wayfarer.expense_split (expense_id, user_id, share, is_paid)
            VALUES ($1, $2, $3, FALSE)
            ",
        )
        .bind(expense_id)
        .bind(user_id)
        .bind(share.amount())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// An expense's splits with debtor names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn splits_of(
        conn: &mut PgConnection,
        expense_id: ExpenseId,
    ) -> Result<Vec<ExpenseSplit>, RepositoryError> {
        let rows = sqlx::query_as::<_, SplitRow>(
            r"
            SELECT s.expense_id, s.user_id, u.display_name, s.share, s.is_paid
            FROM wayfarer.expense_split s
            JOIN wayfarer.user u ON u.id = s.user_id
            WHERE s.expense_id = $1
            ORDER BY u.display_name, s.user_id
            ",
        )
        .bind(expense_id)
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter().map(ExpenseSplit::try_from).collect()
    }
}
