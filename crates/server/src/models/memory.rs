//! Trip memories: photos and notes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wayfarer_core::{MemoryId, MemoryKind, TripId, UserId};

use super::trip::optional;

/// A photo reference or a written note attached to a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Memory {
    pub id: MemoryId,
    pub trip_id: TripId,
    pub user_id: UserId,
    /// Author's display name.
    pub author_name: String,
    pub kind: MemoryKind,
    pub description: Option<String>,
    pub media_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A memory as submitted by a member.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMemory {
    pub kind: MemoryKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
}

impl NewMemory {
    /// A photo needs a media reference, a note needs text.
    ///
    /// # Errors
    ///
    /// Returns a message suitable for a 400 response.
    pub fn validated(self) -> Result<Self, String> {
        let description = optional(self.description);
        let media_url = optional(self.media_url);
        match self.kind {
            MemoryKind::Photo if media_url.is_none() => {
                Err("a photo memory needs a media_url".to_string())
            }
            MemoryKind::Note if description.is_none() => {
                Err("a note memory needs a description".to_string())
            }
            kind => Ok(Self {
                kind,
                description,
                media_url,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(kind: MemoryKind, description: Option<&str>, media_url: Option<&str>) -> NewMemory {
        NewMemory {
            kind,
            description: description.map(String::from),
            media_url: media_url.map(String::from),
        }
    }

    #[test]
    fn test_photo_requires_media() {
        assert!(memory(MemoryKind::Photo, Some("sunset"), None).validated().is_err());
        assert!(memory(MemoryKind::Photo, None, Some("s3://trip/1.jpg")).validated().is_ok());
    }

    #[test]
    fn test_note_requires_text() {
        assert!(memory(MemoryKind::Note, Some("  "), None).validated().is_err());
        assert!(memory(MemoryKind::Note, Some("Best pastel de nata"), None).validated().is_ok());
    }
}
