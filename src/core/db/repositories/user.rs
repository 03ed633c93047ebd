//! User repository for database operations
//!
//! Stores identities with already-hashed credentials. Hashing itself lives in
//! `core::auth::password`; this layer never sees a plaintext password.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::DbError;
use crate::core::db::models::{CreateUser, UpdateUser, User};

/// User repository error types
#[derive(Debug, thiserror::Error)]
pub enum UserRepositoryError {
    #[error("User not found")]
    NotFound,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<DbError> for UserRepositoryError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConnectionError(e) => UserRepositoryError::DatabaseError(e),
            _ => UserRepositoryError::DatabaseError(sqlx::Error::Protocol(err.to_string())),
        }
    }
}

/// Maps a unique-constraint violation on `users.email` to a domain error
fn map_unique_email(err: sqlx::Error) -> UserRepositoryError {
    if err
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
    {
        UserRepositoryError::EmailAlreadyExists
    } else {
        UserRepositoryError::DatabaseError(err)
    }
}

/// Storage contract for identities
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; fails with `EmailAlreadyExists` on a duplicate email
    async fn create(&self, dto: &CreateUser) -> Result<User, UserRepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError>;

    /// Replace email and credential of an existing user
    async fn update(&self, id: Uuid, updates: &UpdateUser) -> Result<User, UserRepositoryError>;

    /// Remove every user. Chirps and refresh tokens go with them.
    async fn delete_all(&self) -> Result<u64, UserRepositoryError>;
}

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, dto: &CreateUser) -> Result<User, UserRepositoryError> {
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, hashed_password, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, email, hashed_password, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&dto.email)
        .bind(&dto.hashed_password)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_email)?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, hashed_password, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update(&self, id: Uuid, updates: &UpdateUser) -> Result<User, UserRepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = $2, hashed_password = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, hashed_password, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&updates.email)
        .bind(&updates.hashed_password)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_email)?;

        user.ok_or(UserRepositoryError::NotFound)
    }

    async fn delete_all(&self) -> Result<u64, UserRepositoryError> {
        let result = sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
