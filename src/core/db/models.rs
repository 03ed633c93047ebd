//! Database models for Chirpy
//!
//! This module defines the entity structs that map to PostgreSQL tables and the
//! response shapes that are safe to hand back to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================================================
// User Model
// ============================================================================

/// User entity representing a registered identity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User data for creation (password must already be hashed)
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub hashed_password: String,
}

/// Replacement credentials for an existing user
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub email: String,
    pub hashed_password: String,
}

/// User without sensitive data (for API responses)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ============================================================================
// Chirp Model
// ============================================================================

/// Chirp entity. `user_id` is the owner and never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Chirp {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Chirp data for creation (body must already be cleaned)
#[derive(Debug, Clone)]
pub struct CreateChirp {
    pub body: String,
    pub user_id: Uuid,
}

// ============================================================================
// Refresh Token Model
// ============================================================================

/// Persisted refresh token row, keyed by the opaque token string
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Build a fresh, unrevoked token row
    pub fn new(token: impl Into<String>, user_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            token: token.into(),
            user_id,
            expires_at,
            revoked_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// A token is usable only while it is neither expired nor revoked.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        let expired = self.is_expired(now);
        let revoked = self.is_revoked();
        !expired & !revoked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "walt@breakingbad.com".to_string(),
            hashed_password: "$2b$04$notarealhash".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_serialization_skips_password_hash() {
        let json = serde_json::to_string(&sample_user()).unwrap();

        assert!(json.contains("walt@breakingbad.com"));
        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("notarealhash"));
    }

    #[test]
    fn test_user_response_from_user() {
        let user = sample_user();
        let id = user.id;
        let response: UserResponse = user.into();

        assert_eq!(response.id, id);
        assert_eq!(response.email, "walt@breakingbad.com");
    }

    #[test]
    fn test_refresh_token_new_is_active() {
        let token = RefreshToken::new("abc", Uuid::new_v4(), Utc::now() + Duration::days(1));

        assert!(token.revoked_at.is_none());
        assert!(token.is_active(Utc::now()));
    }

    #[test]
    fn test_refresh_token_expired_is_inactive() {
        let token = RefreshToken::new("abc", Uuid::new_v4(), Utc::now() - Duration::seconds(1));

        assert!(token.is_expired(Utc::now()));
        assert!(!token.is_active(Utc::now()));
    }

    #[test]
    fn test_refresh_token_expires_exactly_at_deadline() {
        let expires_at = Utc::now() + Duration::hours(1);
        let token = RefreshToken::new("abc", Uuid::new_v4(), expires_at);

        assert!(token.is_active(expires_at - Duration::milliseconds(1)));
        assert!(!token.is_active(expires_at));
    }

    #[test]
    fn test_refresh_token_revoked_is_inactive() {
        let mut token = RefreshToken::new("abc", Uuid::new_v4(), Utc::now() + Duration::days(1));
        token.revoked_at = Some(Utc::now());

        assert!(!token.is_expired(Utc::now()));
        assert!(token.is_revoked());
        assert!(!token.is_active(Utc::now()));
    }
}
