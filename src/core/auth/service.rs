//! Session service
//!
//! Business logic for registration, login, access token refresh, logout
//! (refresh token revocation) and credential updates. Coordinates the user
//! store, the password hasher, the access token codec and the refresh token
//! manager.
//!
//! A refresh token moves from active to either expired (time passes) or
//! revoked (explicit logout). Both are terminal. Refreshing does not rotate
//! the refresh token.

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::auth::jwt::{TokenCodec, TokenError};
use crate::core::auth::password::{PasswordError, PasswordHasher};
use crate::core::auth::refresh::{RefreshTokenError, RefreshTokenManager};
use crate::core::db::models::{CreateUser, RefreshToken, UpdateUser, User};
use crate::core::db::repositories::{RefreshTokenStoreError, UserRepositoryError, UserStore};

/// Authentication and authorization error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Incorrect password")]
    BadCredential,

    #[error("User not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Malformed authorization header")]
    MalformedHeader,

    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<UserRepositoryError> for AuthError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::NotFound => AuthError::NotFound,
            UserRepositoryError::EmailAlreadyExists => AuthError::EmailAlreadyExists,
            UserRepositoryError::DatabaseError(e) => AuthError::InternalError(e.to_string()),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Mismatch => AuthError::BadCredential,
            PasswordError::Hashing(e) => AuthError::InternalError(e),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::Invalid => AuthError::Unauthorized,
            TokenError::Encoding(e) => AuthError::InternalError(e),
        }
    }
}

impl From<RefreshTokenError> for AuthError {
    fn from(err: RefreshTokenError) -> Self {
        match err {
            RefreshTokenError::Store(RefreshTokenStoreError::NotFound) => AuthError::Unauthorized,
            other => AuthError::InternalError(other.to_string()),
        }
    }
}

/// Registration request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Login request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Credential update request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct UpdateUserRequest {
    pub email: String,
    pub password: String,
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: RefreshToken,
}

fn require_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    if email.trim().is_empty() {
        return Err(AuthError::InvalidInput("email is required"));
    }
    if password.is_empty() {
        return Err(AuthError::InvalidInput("password is required"));
    }
    Ok(())
}

/// Session service
#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UserStore>,
    refresh_tokens: RefreshTokenManager,
    codec: Arc<dyn TokenCodec>,
    hasher: PasswordHasher,
    access_token_ttl: Duration,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_tokens: RefreshTokenManager,
        codec: Arc<dyn TokenCodec>,
        hasher: PasswordHasher,
        access_token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            codec,
            hasher,
            access_token_ttl,
        }
    }

    /// Codec used to issue and check access tokens
    pub fn codec(&self) -> &dyn TokenCodec {
        self.codec.as_ref()
    }

    /// Register a new user
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AuthError> {
        require_credentials(&request.email, &request.password)?;

        let hashed_password = self.hasher.hash(&request.password)?;
        let user = self
            .users
            .create(&CreateUser {
                email: request.email,
                hashed_password,
            })
            .await?;

        Ok(user)
    }

    /// Verify credentials and open a session. This is the only place refresh
    /// tokens are created.
    pub async fn login(&self, request: LoginRequest) -> Result<Session, AuthError> {
        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::NotFound)?;

        self.hasher.verify(&request.password, &user.hashed_password)?;

        let access_token = self.codec.issue(user.id, self.access_token_ttl)?;
        let refresh_token = self.refresh_tokens.issue(user.id).await?;

        Ok(Session {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let row = self.refresh_tokens.resolve(refresh_token).await?;

        // Expired and revoked are indistinguishable to the caller
        if !row.is_active(Utc::now()) {
            tracing::debug!("Refresh rejected for user {}: token inactive", row.user_id);
            return Err(AuthError::Unauthorized);
        }

        Ok(self.codec.issue(row.user_id, self.access_token_ttl)?)
    }

    /// Revoke a refresh token. Unknown tokens count as already logged out.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        match self.refresh_tokens.revoke(refresh_token).await {
            Ok(()) | Err(RefreshTokenError::Store(RefreshTokenStoreError::NotFound)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace email and password of the acting user
    pub async fn update_identity(
        &self,
        user_id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<User, AuthError> {
        require_credentials(&request.email, &request.password)?;

        let hashed_password = self.hasher.hash(&request.password)?;
        let user = self
            .users
            .update(
                user_id,
                &UpdateUser {
                    email: request.email,
                    hashed_password,
                },
            )
            .await
            .map_err(|e| match e {
                // The token outlived its user
                UserRepositoryError::NotFound => AuthError::Unauthorized,
                other => other.into(),
            })?;

        Ok(user)
    }
}
