//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wayfarer_core::{AuthProvider, Email, UserId, UserRole};

/// Longest display name accepted.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 80;

/// Longest bio accepted.
pub const MAX_BIO_LENGTH: usize = 1000;

/// A Wayfarer account. The password hash never leaves the repository.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub auth_provider: AuthProvider,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// The fields other travellers see next to a name in lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: UserId,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// Changes a user may make to their own profile. `None` leaves a field as is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Trim a display name and check its length.
///
/// # Errors
///
/// Returns a message suitable for a 400 response.
pub fn normalize_display_name(name: &str) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("display name cannot be empty".to_string());
    }
    if trimmed.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(format!(
            "display name must be at most {MAX_DISPLAY_NAME_LENGTH} characters"
        ));
    }
    Ok(trimmed.to_string())
}

impl ProfileUpdate {
    /// Normalize the update, rejecting invalid values.
    ///
    /// # Errors
    ///
    /// Returns a message suitable for a 400 response.
    pub fn validated(self) -> Result<Self, String> {
        let display_name = self
            .display_name
            .as_deref()
            .map(normalize_display_name)
            .transpose()?;
        if let Some(bio) = &self.bio
            && bio.chars().count() > MAX_BIO_LENGTH
        {
            return Err(format!("bio must be at most {MAX_BIO_LENGTH} characters"));
        }
        Ok(Self {
            display_name,
            avatar_url: self.avatar_url.map(|u| u.trim().to_string()),
            bio: self.bio,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_is_trimmed() {
        assert_eq!(normalize_display_name("  Ana  ").unwrap(), "Ana");
        assert!(normalize_display_name("   ").is_err());
        assert!(normalize_display_name(&"x".repeat(81)).is_err());
    }

    #[test]
    fn test_profile_update_validation() {
        let update = ProfileUpdate {
            display_name: Some(" Bea ".to_string()),
            ..ProfileUpdate::default()
        }
        .validated()
        .unwrap();
        assert_eq!(update.display_name.as_deref(), Some("Bea"));

        let too_long = ProfileUpdate {
            bio: Some("a".repeat(MAX_BIO_LENGTH + 1)),
            ..ProfileUpdate::default()
        };
        assert!(too_long.validated().is_err());
    }

    #[test]
    fn test_user_serialization_has_no_secrets() {
        let user = User {
            id: UserId::new(1),
            email: Email::parse("ana@example.com").unwrap(),
            display_name: "Ana".to_string(),
            avatar_url: None,
            bio: None,
            auth_provider: AuthProvider::Local,
            role: UserRole::User,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["email"], "ana@example.com");
        assert_eq!(json["role"], "user");
        assert!(json.get("password_hash").is_none());
    }
}
