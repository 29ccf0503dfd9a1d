//! Friends and chat.

use chrono::{DateTime, Utc};
use serde::Serialize;

use wayfarer_core::{FriendRequestId, FriendStatus, MessageId, TripId, TripMessageId, UserId};

/// Longest chat message accepted.
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// A friend request between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct FriendRequest {
    pub id: FriendRequestId,
    pub from_user: UserId,
    pub to_user: UserId,
    pub status: FriendStatus,
    pub created_at: DateTime<Utc>,
}

/// A pending request addressed to the caller, with the sender's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct IncomingRequest {
    pub id: FriendRequestId,
    pub from_user: UserId,
    pub from_name: String,
    pub created_at: DateTime<Utc>,
}

/// A private message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub content: String,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
}

/// A message in a trip's group chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct TripMessage {
    pub id: TripMessageId,
    pub trip_id: TripId,
    pub sender_id: UserId,
    pub sender_name: String,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

/// Trim message text and check its length.
///
/// # Errors
///
/// Returns a message suitable for a 400 response.
pub fn normalize_message(content: &str) -> Result<String, String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err("message cannot be empty".to_string());
    }
    if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(format!(
            "message must be at most {MAX_MESSAGE_LENGTH} characters"
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_limits() {
        assert_eq!(normalize_message(" hi ").as_deref(), Ok("hi"));
        assert!(normalize_message("").is_err());
        assert!(normalize_message(&"a".repeat(MAX_MESSAGE_LENGTH + 1)).is_err());
    }
}
