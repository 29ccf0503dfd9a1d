//! Trip and roster domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use wayfarer_core::membership::RosterEntry;
use wayfarer_core::{MemberRole, MemberStatus, TripId, UserId};

/// A shared journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Trip {
    pub id: TripId,
    pub name: String,
    pub destination: String,
    pub origin: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// The current owner. Follows ownership on succession.
    pub created_by: UserId,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields of a trip that its owner chooses, on create and on update.
#[derive(Debug, Clone, Deserialize)]
pub struct TripDetails {
    pub name: String,
    pub destination: String,
    #[serde(default)]
    pub origin: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl TripDetails {
    /// Trim text fields and check the date range.
    ///
    /// # Errors
    ///
    /// Returns a message suitable for a 400 response.
    pub fn validated(self) -> Result<Self, String> {
        let name = required(&self.name, "name")?;
        let destination = required(&self.destination, "destination")?;
        if self.end_date < self.start_date {
            return Err("end_date must not be before start_date".to_string());
        }
        Ok(Self {
            name,
            destination,
            origin: optional(self.origin),
            start_date: self.start_date,
            end_date: self.end_date,
            image_url: optional(self.image_url),
        })
    }
}

/// A roster row joined with the member's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct TripMember {
    pub trip_id: TripId,
    pub user_id: UserId,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: MemberRole,
    pub status: MemberStatus,
    pub joined_at: DateTime<Utc>,
}

impl From<&TripMember> for RosterEntry {
    fn from(member: &TripMember) -> Self {
        Self {
            user_id: member.user_id,
            role: member.role,
            status: member.status,
            joined_at: member.joined_at,
        }
    }
}

pub(crate) fn required(value: &str, field: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(format!("{field} cannot be empty"))
    } else {
        Ok(trimmed.to_string())
    }
}

pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
