//! Trip roster changes: invitations, answers, removals and succession.
//!
//! Every operation here runs in a `READ COMMITTED` transaction that first
//! locks the trip row `FOR UPDATE`, so roster changes on one trip are applied
//! one at a time. The roster is read after the lock is granted, and each
//! statement sees the rows committed by whoever held the lock before. The
//! decisions come from [`wayfarer_core::membership`]; this module loads the
//! roster, asks, and writes the answer.

use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use wayfarer_core::membership::{
    self, Departure, InvitationAnswer, MembershipError, RosterEntry,
};
use wayfarer_core::{Email, MemberRole, MemberStatus, TripId, UserId};

use super::ServiceError;
use crate::db::trips::TripLock;
use crate::db::{MemberRepository, RepositoryError, TripRepository, UserRepository};
use crate::models::trip::TripMember;

/// Open a transaction for a roster change.
///
/// Snapshot isolation would pin the snapshot before the trip lock is
/// granted and hide a roster change committed while waiting for it.
pub(crate) async fn begin_roster_tx(
    pool: &PgPool,
) -> Result<Transaction<'static, Postgres>, RepositoryError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL READ COMMITTED")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}

/// Lock the trip and load its roster.
async fn locked_roster(
    conn: &mut PgConnection,
    trip_id: TripId,
) -> Result<Vec<RosterEntry>, ServiceError> {
    TripRepository::lock(&mut *conn, trip_id, TripLock::Update)
        .await?
        .ok_or(ServiceError::NotFound("trip"))?;
    Ok(MemberRepository::roster(&mut *conn, trip_id).await?)
}

fn is_on_roster(roster: &[RosterEntry], user: UserId) -> bool {
    roster.iter().any(|entry| entry.user_id == user)
}

/// Apply a planned departure. The caller holds the trip lock.
///
/// Succession writes in an order the single-owner index accepts: the old
/// owner's row goes before the heir is promoted.
pub(crate) async fn execute_departure(
    conn: &mut PgConnection,
    trip_id: TripId,
    departing: UserId,
    departure: Departure,
) -> Result<(), RepositoryError> {
    match departure {
        Departure::Removed => {
            MemberRepository::delete(&mut *conn, trip_id, departing).await?;
        }
        Departure::OwnershipTransferred { heir } => {
            MemberRepository::delete(&mut *conn, trip_id, departing).await?;
            MemberRepository::promote(&mut *conn, trip_id, heir).await?;
            TripRepository::set_creator(&mut *conn, trip_id, heir).await?;
            tracing::info!(%trip_id, from = %departing, to = %heir, "Trip ownership transferred");
        }
        Departure::TripDissolved => {
            let summary = TripRepository::delete_cascade(&mut *conn, trip_id).await?;
            tracing::info!(%trip_id, ?summary, "Trip dissolved after last member left");
        }
    }
    Ok(())
}

/// Service for roster changes.
pub struct MembershipService<'a> {
    pool: &'a PgPool,
}

impl<'a> MembershipService<'a> {
    /// Create a new membership service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Invite the user with `email` to the trip as a pending member.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Invalid` if the email is malformed.
    /// - `ServiceError::NotFound` if the trip is not visible to `actor` or no
    ///   user has the email.
    /// - `MembershipError::NotOwner` if `actor` is not the owner.
    /// - `MembershipError::AlreadyMember` if the invitee already has a row.
    pub async fn invite(
        &self,
        trip_id: TripId,
        actor: UserId,
        email: &str,
    ) -> Result<TripMember, ServiceError> {
        let email = Email::parse(email).map_err(|e| ServiceError::Invalid(e.to_string()))?;

        let mut tx = begin_roster_tx(self.pool).await?;
        let roster = locked_roster(&mut tx, trip_id).await?;
        if !is_on_roster(&roster, actor) {
            return Err(ServiceError::NotFound("trip"));
        }

        let invitee = UserRepository::new(self.pool)
            .get_by_email(&email)
            .await?
            .ok_or(ServiceError::NotFound("user"))?;

        membership::check_invite(&roster, actor, invitee.id)?;
        let joined_at = MemberRepository::insert_pending(&mut tx, trip_id, invitee.id).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(%trip_id, invitee = %invitee.id, "Trip invitation sent");

        Ok(TripMember {
            trip_id,
            user_id: invitee.id,
            display_name: invitee.display_name,
            avatar_url: invitee.avatar_url,
            role: MemberRole::Member,
            status: MemberStatus::Pending,
            joined_at,
        })
    }

    /// Accept or decline `user`'s invitation to the trip.
    ///
    /// Accepting an invitation that was already accepted changes nothing.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if the trip does not exist.
    /// - `MembershipError::NoInvitation` if there is nothing to answer.
    pub async fn respond(
        &self,
        trip_id: TripId,
        user: UserId,
        accept: bool,
    ) -> Result<InvitationAnswer, ServiceError> {
        let mut tx = begin_roster_tx(self.pool).await?;
        let roster = locked_roster(&mut tx, trip_id).await?;

        let answer = membership::answer_invitation(&roster, user, accept)?;
        match answer {
            InvitationAnswer::Accept => MemberRepository::accept(&mut tx, trip_id, user).await?,
            InvitationAnswer::Decline => MemberRepository::delete(&mut tx, trip_id, user).await?,
            InvitationAnswer::AlreadyAccepted => {}
        }
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(%trip_id, %user, ?answer, "Trip invitation answered");
        Ok(answer)
    }

    /// Remove `target` from the trip, on their own behalf or by the owner.
    ///
    /// When the owner leaves, the earliest-joined accepted member inherits
    /// the trip. When nobody is left to inherit it, the trip is deleted with
    /// everything in it.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if the trip is not visible to `actor`.
    /// - `MembershipError::NotOwner` if a non-owner removes someone else.
    /// - `MembershipError::NotAMember` if `target` is not on the trip.
    pub async fn remove(
        &self,
        trip_id: TripId,
        actor: UserId,
        target: UserId,
    ) -> Result<Departure, ServiceError> {
        let mut tx = begin_roster_tx(self.pool).await?;
        let roster = locked_roster(&mut tx, trip_id).await?;
        if !is_on_roster(&roster, actor) {
            return Err(ServiceError::NotFound("trip"));
        }

        membership::authorize_removal(&roster, actor, target)?;
        let departure = membership::plan_departure(&roster, target)?;
        execute_departure(&mut tx, trip_id, target, departure).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(%trip_id, %actor, %target, ?departure, "Member removed from trip");
        Ok(departure)
    }

    /// Delete the trip and everything in it. Owner only.
    ///
    /// # Errors
    ///
    /// - `ServiceError::NotFound` if the trip is not visible to `actor`.
    /// - `MembershipError::NotOwner` if `actor` is not the owner.
    pub async fn delete_trip(&self, trip_id: TripId, actor: UserId) -> Result<(), ServiceError> {
        let mut tx = begin_roster_tx(self.pool).await?;
        let roster = locked_roster(&mut tx, trip_id).await?;
        if !is_on_roster(&roster, actor) {
            return Err(ServiceError::NotFound("trip"));
        }
        if membership::owner(&roster) != Some(actor) {
            return Err(MembershipError::NotOwner.into());
        }

        let summary = TripRepository::delete_cascade(&mut tx, trip_id).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(%trip_id, %actor, ?summary, "Trip deleted by owner");
        Ok(())
    }
}

/// Remove `user` from every trip they are on, with succession, inside the
/// caller's transaction. Trips are locked in id order.
pub(crate) async fn depart_all_trips(
    conn: &mut PgConnection,
    user: UserId,
) -> Result<Vec<(TripId, Departure)>, ServiceError> {
    let trips = MemberRepository::trips_of(&mut *conn, user).await?;
    let mut departures = Vec::with_capacity(trips.len());

    for trip_id in trips {
        let roster = locked_roster(&mut *conn, trip_id).await?;
        let departure = membership::plan_departure(&roster, user)?;
        execute_departure(&mut *conn, trip_id, user, departure).await?;
        departures.push((trip_id, departure));
    }

    Ok(departures)
}
