//! Refresh token repository
//!
//! Persists opaque refresh tokens keyed by the token string itself, together
//! with their expiry and revocation state. Revocation is one-way: once
//! `revoked_at` is set no statement in this module clears it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::core::db::models::RefreshToken;

/// Refresh token store error types
#[derive(Debug, thiserror::Error)]
pub enum RefreshTokenStoreError {
    #[error("Refresh token not found")]
    NotFound,

    #[error("Refresh token already exists")]
    Duplicate,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Storage contract for stateful, revocable refresh tokens
#[async_trait]
pub trait RevocableTokenStore: Send + Sync {
    /// Insert a new row. A key collision is reported as `Duplicate`.
    async fn persist(&self, token: &RefreshToken) -> Result<(), RefreshTokenStoreError>;

    /// Look a token up by its opaque string
    async fn resolve(&self, token: &str) -> Result<RefreshToken, RefreshTokenStoreError>;

    /// Set `revoked_at` if it is unset. Revoking twice is a successful no-op.
    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> Result<(), RefreshTokenStoreError>;
}

/// PostgreSQL-backed refresh token repository
#[derive(Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevocableTokenStore for RefreshTokenRepository {
    async fn persist(&self, token: &RefreshToken) -> Result<(), RefreshTokenStoreError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token, user_id, expires_at, revoked_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&token.token)
        .bind(token.user_id)
        .bind(token.expires_at)
        .bind(token.revoked_at)
        .bind(token.created_at)
        .bind(token.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if err
                .as_database_error()
                .is_some_and(|db_err| db_err.is_unique_violation())
            {
                RefreshTokenStoreError::Duplicate
            } else {
                RefreshTokenStoreError::DatabaseError(err)
            }
        })?;

        Ok(())
    }

    async fn resolve(&self, token: &str) -> Result<RefreshToken, RefreshTokenStoreError> {
        let row = sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT token, user_id, expires_at, revoked_at, created_at, updated_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RefreshTokenStoreError::NotFound)
    }

    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> Result<(), RefreshTokenStoreError> {
        // COALESCE keeps the first revocation time under concurrent writers
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = COALESCE(revoked_at, $2),
                updated_at = $2
            WHERE token = $1
            "#,
        )
        .bind(token)
        .bind(at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RefreshTokenStoreError::NotFound);
        }

        Ok(())
    }
}
