//! Refresh token management
//!
//! Refresh tokens are opaque: 256 random bits, hex-encoded. All of their state
//! (owner, expiry, revocation) lives in a `RevocableTokenStore`.

use chrono::{Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::db::models::RefreshToken;
use crate::core::db::repositories::{RefreshTokenStoreError, RevocableTokenStore};

/// Number of random bytes in a refresh token
const REFRESH_TOKEN_BYTES: usize = 32;

/// Refresh token manager error types
#[derive(Debug, thiserror::Error)]
pub enum RefreshTokenError {
    #[error("Random number generator failure: {0}")]
    Rng(String),

    #[error("Refresh token lifetime out of range")]
    LifetimeOutOfRange,

    #[error(transparent)]
    Store(#[from] RefreshTokenStoreError),
}

/// Issues, resolves and revokes refresh tokens
#[derive(Clone)]
pub struct RefreshTokenManager {
    store: Arc<dyn RevocableTokenStore>,
    ttl: Duration,
}

impl RefreshTokenManager {
    pub fn new(store: Arc<dyn RevocableTokenStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Draw a new opaque token from the OS CSPRNG
    pub fn generate() -> Result<String, RefreshTokenError> {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| RefreshTokenError::Rng(e.to_string()))?;
        Ok(hex::encode(bytes))
    }

    /// Store a token for `user_id` that expires after `ttl`
    pub async fn persist(
        &self,
        token: &str,
        user_id: Uuid,
        ttl: Duration,
    ) -> Result<RefreshToken, RefreshTokenError> {
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or(RefreshTokenError::LifetimeOutOfRange)?;
        let row = RefreshToken::new(token, user_id, expires_at);
        self.store.persist(&row).await?;
        Ok(row)
    }

    /// Generate and persist a token with the configured lifetime
    pub async fn issue(&self, user_id: Uuid) -> Result<RefreshToken, RefreshTokenError> {
        let token = Self::generate()?;
        self.persist(&token, user_id, self.ttl).await
    }

    pub async fn resolve(&self, token: &str) -> Result<RefreshToken, RefreshTokenError> {
        Ok(self.store.resolve(token).await?)
    }

    /// Mark a token revoked. Already-revoked tokens stay revoked at their first time.
    pub async fn revoke(&self, token: &str) -> Result<(), RefreshTokenError> {
        Ok(self.store.revoke(token, Utc::now()).await?)
    }
}
