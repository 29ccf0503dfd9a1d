//! Expense service: recording expenses with their splits.

use serde::Serialize;
use sqlx::PgPool;

use wayfarer_core::balances::{self, Balance};
use wayfarer_core::splitting::{self, ShareBasis};
use wayfarer_core::{ExpenseId, MemberStatus, TripId, UserId};

use super::{ServiceError, access};
use crate::db::trips::TripLock;
use crate::db::{ExpenseRepository, MemberRepository, RepositoryError, TripRepository};
use crate::models::expense::{Expense, ExpenseSplit, NewExpense};

/// An expense as created, with the split rows written for it.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedExpense {
    pub expense: Expense,
    pub splits: Vec<ExpenseSplit>,
}

/// Service for expenses and settlement.
pub struct ExpenseService<'a> {
    pool: &'a PgPool,
    basis: ShareBasis,
}

impl<'a> ExpenseService<'a> {
    /// Create a new expense service splitting on `basis`.
    #[must_use]
    pub const fn new(pool: &'a PgPool, basis: ShareBasis) -> Self {
        Self { pool, basis }
    }

    /// Record an expense paid by `payer` and split it across the roster.
    ///
    /// The roster is read under a share lock on the trip row, so a roster
    /// change cannot interleave with the split snapshot. Pending invitees
    /// are part of the roster.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if the payer is not on the trip.
    /// - `ServiceError::Forbidden` if the payer has not accepted.
    /// - `ServiceError::Repository` if a write fails; nothing is kept.
    pub async fn create(
        &self,
        trip_id: TripId,
        payer: UserId,
        new: NewExpense,
    ) -> Result<CreatedExpense, ServiceError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        TripRepository::lock(&mut tx, trip_id, TripLock::Share)
            .await?
            .ok_or(ServiceError::NotFound("trip"))?;
        let roster = MemberRepository::roster(&mut tx, trip_id).await?;

        match roster.iter().find(|entry| entry.user_id == payer) {
            None => return Err(ServiceError::NotFound("trip")),
            Some(entry) if entry.status != MemberStatus::Accepted => {
                return Err(ServiceError::Forbidden("accept the invitation first"));
            }
            Some(_) => {}
        }

        let members: Vec<UserId> = roster.iter().map(|entry| entry.user_id).collect();
        let plan = splitting::plan_splits(new.amount, payer, &members, self.basis)
            .map_err(|e| ServiceError::Invalid(e.to_string()))?;

        let expense =
            ExpenseRepository::insert(&mut tx, trip_id, payer, &new.description, new.amount)
                .await?;
        for split in &plan.splits {
            ExpenseRepository::insert_split(&mut tx, expense.id, split.user_id, split.share)
                .await?;
        }
        let splits = ExpenseRepository::splits_of(&mut tx, expense.id).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            %trip_id,
            expense_id = %expense.id,
            %payer,
            amount = %expense.amount,
            splits = splits.len(),
            payer_portion = %plan.payer_portion,
            "Expense recorded"
        );

        Ok(CreatedExpense { expense, splits })
    }

    async fn expense_on_visible_trip(
        &self,
        expense_id: ExpenseId,
        actor: UserId,
    ) -> Result<(Expense, bool), ServiceError> {
        let expense = ExpenseRepository::new(self.pool)
            .get(expense_id)
            .await?
            .ok_or(ServiceError::NotFound("expense"))?;
        let membership = access::require_member(self.pool, expense.trip_id, actor)
            .await
            .map_err(|e| access::hide_trip_as(e, "expense"))?;
        Ok((expense, membership.is_owner()))
    }

    /// Mark `debtor`'s split of an expense paid or unpaid.
    ///
    /// Only the expense's payer or the debtor may do this.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if the expense is not visible to `actor`.
    /// - `ServiceError::Forbidden` if `actor` is neither payer nor debtor.
    /// - `RepositoryError::NotFound` if `debtor` has no split on the expense.
    pub async fn set_split_paid(
        &self,
        expense_id: ExpenseId,
        actor: UserId,
        debtor: UserId,
        is_paid: bool,
    ) -> Result<(), ServiceError> {
        let (expense, _) = self.expense_on_visible_trip(expense_id, actor).await?;
        if actor != expense.paid_by && actor != debtor {
            return Err(ServiceError::Forbidden(
                "only the payer or the debtor can change a split",
            ));
        }

        ExpenseRepository::new(self.pool)
            .set_split_paid(expense_id, debtor, is_paid)
            .await?;

        tracing::info!(%expense_id, %debtor, is_paid, "Split paid flag changed");
        Ok(())
    }

    /// Delete an expense with its splits. Payer or trip owner only.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if the expense is not visible to `actor`.
    /// - `ServiceError::Forbidden` if `actor` is neither payer nor owner.
    pub async fn delete(&self, expense_id: ExpenseId, actor: UserId) -> Result<(), ServiceError> {
        let (expense, actor_is_owner) = self.expense_on_visible_trip(expense_id, actor).await?;
        if actor != expense.paid_by && !actor_is_owner {
            return Err(ServiceError::Forbidden(
                "only the payer or the trip owner can delete an expense",
            ));
        }

        ExpenseRepository::new(self.pool).delete(expense_id).await?;

        tracing::info!(%expense_id, trip_id = %expense.trip_id, %actor, "Expense deleted");
        Ok(())
    }

    /// Net unpaid splits on the trip into per-member balances.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound`/`Forbidden` if `actor` is not an
    /// accepted member.
    pub async fn balances(
        &self,
        trip_id: TripId,
        actor: UserId,
    ) -> Result<Vec<Balance>, ServiceError> {
        access::require_member(self.pool, trip_id, actor).await?;
        let obligations = ExpenseRepository::new(self.pool).obligations(trip_id).await?;
        Ok(balances::settle(&obligations))
    }
}
