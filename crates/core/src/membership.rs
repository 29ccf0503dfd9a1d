//! Trip membership rules.
//!
//! The server loads a trip's roster inside a locked transaction, asks these
//! functions what should happen, and then executes the returned plan. Keeping
//! the decisions here makes them testable without a database.
//!
//! Lifecycle per (trip, user): `none -> pending -> accepted -> removed`. An
//! accepted member is either the trip's single owner or a plain member.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{MemberRole, MemberStatus, UserId};

/// Why a membership change was refused.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipError {
    /// The target user has no membership row on this trip.
    #[error("user is not a member of this trip")]
    NotAMember,
    /// No pending invitation exists for the user.
    #[error("no pending invitation for this trip")]
    NoInvitation,
    /// The user already has a membership row (pending or accepted).
    #[error("user is already invited to or a member of this trip")]
    AlreadyMember,
    /// The acting user lacks the rights for this change.
    #[error("only the trip owner can do this")]
    NotOwner,
}

/// One row of a trip's roster, as the rules need to see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub user_id: UserId,
    pub role: MemberRole,
    pub status: MemberStatus,
    pub joined_at: DateTime<Utc>,
}

impl RosterEntry {
    /// Whether this entry is the accepted owner.
    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.role == MemberRole::Owner && self.status == MemberStatus::Accepted
    }
}

/// What removing a member does to the trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Departure {
    /// A non-owner row was deleted.
    Removed,
    /// The owner left; `heir` is now owner and the trip's creator.
    OwnershipTransferred {
        /// The promoted member.
        heir: UserId,
    },
    /// The owner was the last accepted member; the trip and all its data go.
    TripDissolved,
}

/// Outcome of answering an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationAnswer {
    /// Flip the row to accepted.
    Accept,
    /// Already accepted; nothing to write.
    AlreadyAccepted,
    /// Delete the pending row.
    Decline,
}

fn find(roster: &[RosterEntry], user_id: UserId) -> Option<&RosterEntry> {
    roster.iter().find(|entry| entry.user_id == user_id)
}

/// The trip's current owner, if any.
#[must_use]
pub fn owner(roster: &[RosterEntry]) -> Option<UserId> {
    roster
        .iter()
        .find(|entry| entry.is_owner())
        .map(|entry| entry.user_id)
}

/// Pick who inherits ownership when `departing` leaves.
///
/// Only accepted members other than the departing user qualify. The earliest
/// `joined_at` wins; equal timestamps fall back to the lower user id so the
/// choice never depends on row order.
#[must_use]
pub fn choose_heir(roster: &[RosterEntry], departing: UserId) -> Option<UserId> {
    roster
        .iter()
        .filter(|entry| entry.user_id != departing && entry.status == MemberStatus::Accepted)
        .min_by_key(|entry| (entry.joined_at, entry.user_id))
        .map(|entry| entry.user_id)
}

/// Decide what removing `departing` from the trip means.
///
/// # Errors
///
/// Returns [`MembershipError::NotAMember`] if `departing` has no row.
pub fn plan_departure(
    roster: &[RosterEntry],
    departing: UserId,
) -> Result<Departure, MembershipError> {
    let entry = find(roster, departing).ok_or(MembershipError::NotAMember)?;

    if entry.role != MemberRole::Owner {
        return Ok(Departure::Removed);
    }

    let departure = match choose_heir(roster, departing) {
        Some(heir) => Departure::OwnershipTransferred { heir },
        None => Departure::TripDissolved,
    };
    Ok(departure)
}

/// Check that `actor` may remove `target` from the trip.
///
/// Anyone may leave; only the owner may remove someone else.
///
/// # Errors
///
/// Returns [`MembershipError::NotOwner`] when a non-owner removes another user.
pub fn authorize_removal(
    roster: &[RosterEntry],
    actor: UserId,
    target: UserId,
) -> Result<(), MembershipError> {
    if actor == target || owner(roster) == Some(actor) {
        Ok(())
    } else {
        Err(MembershipError::NotOwner)
    }
}

/// Check that `invitee` can be invited by `actor`.
///
/// # Errors
///
/// Returns [`MembershipError::NotOwner`] if `actor` is not the owner, or
/// [`MembershipError::AlreadyMember`] if `invitee` already has a row.
pub fn check_invite(
    roster: &[RosterEntry],
    actor: UserId,
    invitee: UserId,
) -> Result<(), MembershipError> {
    if owner(roster) != Some(actor) {
        return Err(MembershipError::NotOwner);
    }
    if find(roster, invitee).is_some() {
        return Err(MembershipError::AlreadyMember);
    }
    Ok(())
}

/// Decide how to apply `user`'s answer to their invitation.
///
/// Accepting twice is a harmless no-op. Declining only works on a pending
/// invitation; an accepted member leaves through removal instead.
///
/// # Errors
///
/// Returns [`MembershipError::NoInvitation`] when there is nothing to answer.
pub fn answer_invitation(
    roster: &[RosterEntry],
    user: UserId,
    accept: bool,
) -> Result<InvitationAnswer, MembershipError> {
    let status = find(roster, user).map(|entry| entry.status);
    match (status, accept) {
        (Some(MemberStatus::Pending), true) => Ok(InvitationAnswer::Accept),
        (Some(MemberStatus::Accepted), true) => Ok(InvitationAnswer::AlreadyAccepted),
        (Some(MemberStatus::Pending), false) => Ok(InvitationAnswer::Decline),
        (Some(MemberStatus::Accepted) | None, false) | (None, true) => {
            Err(MembershipError::NoInvitation)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn entry(id: i32, role: MemberRole, status: MemberStatus, minutes: i64) -> RosterEntry {
        RosterEntry {
            user_id: UserId::new(id),
            role,
            status,
            joined_at: at(minutes),
        }
    }

    fn owner_entry(id: i32) -> RosterEntry {
        entry(id, MemberRole::Owner, MemberStatus::Accepted, 0)
    }

    #[test]
    fn test_member_leaving_is_plain_removal() {
        let roster = [
            owner_entry(1),
            entry(2, MemberRole::Member, MemberStatus::Accepted, 5),
        ];
        assert_eq!(
            plan_departure(&roster, UserId::new(2)),
            Ok(Departure::Removed)
        );
    }

    #[test]
    fn test_sole_owner_leaving_dissolves_trip() {
        let roster = [owner_entry(1)];
        assert_eq!(
            plan_departure(&roster, UserId::new(1)),
            Ok(Departure::TripDissolved)
        );
    }

    #[test]
    fn test_pending_invitees_do_not_inherit() {
        let roster = [
            owner_entry(1),
            entry(2, MemberRole::Member, MemberStatus::Pending, 1),
        ];
        assert_eq!(
            plan_departure(&roster, UserId::new(1)),
            Ok(Departure::TripDissolved)
        );
    }

    #[test]
    fn test_earliest_accepted_member_inherits() {
        let roster = [
            owner_entry(1),
            entry(7, MemberRole::Member, MemberStatus::Accepted, 30),
            entry(4, MemberRole::Member, MemberStatus::Accepted, 10),
            entry(3, MemberRole::Member, MemberStatus::Pending, 2),
        ];
        assert_eq!(
            plan_departure(&roster, UserId::new(1)),
            Ok(Departure::OwnershipTransferred {
                heir: UserId::new(4)
            })
        );
    }

    #[test]
    fn test_equal_join_times_fall_back_to_user_id() {
        let roster = [
            owner_entry(1),
            entry(9, MemberRole::Member, MemberStatus::Accepted, 10),
            entry(5, MemberRole::Member, MemberStatus::Accepted, 10),
        ];
        assert_eq!(choose_heir(&roster, UserId::new(1)), Some(UserId::new(5)));
    }

    #[test]
    fn test_unknown_user_is_not_a_member() {
        let roster = [owner_entry(1)];
        assert_eq!(
            plan_departure(&roster, UserId::new(2)),
            Err(MembershipError::NotAMember)
        );
    }

    #[test]
    fn test_only_owner_removes_others() {
        let roster = [
            owner_entry(1),
            entry(2, MemberRole::Member, MemberStatus::Accepted, 1),
            entry(3, MemberRole::Member, MemberStatus::Accepted, 2),
        ];
        let (owner_id, b, c) = (UserId::new(1), UserId::new(2), UserId::new(3));
        assert!(authorize_removal(&roster, owner_id, b).is_ok());
        assert!(authorize_removal(&roster, b, b).is_ok());
        assert_eq!(
            authorize_removal(&roster, b, c),
            Err(MembershipError::NotOwner)
        );
    }

    #[test]
    fn test_invite_checks() {
        let roster = [
            owner_entry(1),
            entry(2, MemberRole::Member, MemberStatus::Pending, 1),
        ];
        assert!(check_invite(&roster, UserId::new(1), UserId::new(3)).is_ok());
        assert_eq!(
            check_invite(&roster, UserId::new(1), UserId::new(2)),
            Err(MembershipError::AlreadyMember)
        );
        assert_eq!(
            check_invite(&roster, UserId::new(2), UserId::new(3)),
            Err(MembershipError::NotOwner)
        );
    }

    #[test]
    fn test_invitation_answers() {
        let roster = [
            owner_entry(1),
            entry(2, MemberRole::Member, MemberStatus::Pending, 1),
        ];
        let (a, b, stranger) = (UserId::new(1), UserId::new(2), UserId::new(9));

        assert_eq!(
            answer_invitation(&roster, b, true),
            Ok(InvitationAnswer::Accept)
        );
        assert_eq!(
            answer_invitation(&roster, b, false),
            Ok(InvitationAnswer::Decline)
        );
        assert_eq!(
            answer_invitation(&roster, a, true),
            Ok(InvitationAnswer::AlreadyAccepted)
        );
        assert_eq!(
            answer_invitation(&roster, a, false),
            Err(MembershipError::NoInvitation)
        );
        assert_eq!(
            answer_invitation(&roster, stranger, true),
            Err(MembershipError::NoInvitation)
        );
    }

    #[test]
    fn test_departure_serializes_with_outcome_tag() {
        let json = serde_json::to_value(Departure::OwnershipTransferred {
            heir: UserId::new(4),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"outcome": "ownership_transferred", "heir": 4})
        );
    }
}
