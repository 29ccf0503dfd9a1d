//! Itinerary activities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wayfarer_core::{ActivityId, TripId, UserId};

use super::trip::{optional, required};

/// A scheduled item on a trip's itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Activity {
    pub id: ActivityId,
    pub trip_id: TripId,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_by: UserId,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating or editing an activity.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityDetails {
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
}

impl ActivityDetails {
    /// Trim text fields and check the time range.
    ///
    /// # Errors
    ///
    /// Returns a message suitable for a 400 response.
    pub fn validated(self) -> Result<Self, String> {
        let title = required(&self.title, "title")?;
        if self.ends_at < self.starts_at {
            return Err("ends_at must not be before starts_at".to_string());
        }
        Ok(Self {
            title,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            location: optional(self.location),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_time_range() {
        let json = serde_json::json!({
            "title": "Tram 28",
            "starts_at": "2026-05-02T09:00:00Z",
            "ends_at": "2026-05-02T08:00:00Z",
        });
        let details: ActivityDetails = serde_json::from_value(json).unwrap();
        assert!(details.validated().is_err());
    }
}
