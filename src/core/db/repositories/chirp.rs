//! Chirp repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::{Chirp, CreateChirp};

/// Chirp repository error types
#[derive(Debug, thiserror::Error)]
pub enum ChirpRepositoryError {
    #[error("Chirp not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Storage contract for chirps
#[async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create(&self, dto: &CreateChirp) -> Result<Chirp, ChirpRepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Chirp>, ChirpRepositoryError>;

    /// All chirps, oldest first
    async fn list(&self) -> Result<Vec<Chirp>, ChirpRepositoryError>;

    /// Returns `true` if a row was removed
    async fn delete(&self, id: Uuid) -> Result<bool, ChirpRepositoryError>;
}

/// PostgreSQL-backed chirp repository
#[derive(Clone)]
pub struct ChirpRepository {
    pool: PgPool,
}

impl ChirpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChirpStore for ChirpRepository {
    async fn create(&self, dto: &CreateChirp) -> Result<Chirp, ChirpRepositoryError> {
        let chirp = sqlx::query_as::<_, Chirp>(
            r#"
            INSERT INTO chirps (id, body, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, body, user_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&dto.body)
        .bind(dto.user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(chirp)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Chirp>, ChirpRepositoryError> {
        let chirp = sqlx::query_as::<_, Chirp>(
            r#"
            SELECT id, body, user_id, created_at, updated_at
            FROM chirps
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chirp)
    }

    async fn list(&self) -> Result<Vec<Chirp>, ChirpRepositoryError> {
        let chirps = sqlx::query_as::<_, Chirp>(
            r#"
            SELECT id, body, user_id, created_at, updated_at
            FROM chirps
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(chirps)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ChirpRepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM chirps
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chirp_repository_error_display() {
        assert_eq!(format!("{}", ChirpRepositoryError::NotFound), "Chirp not found");
    }

    #[test]
    fn test_chirp_repository_error_from_sqlx() {
        let err: ChirpRepositoryError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ChirpRepositoryError::DatabaseError(_)));
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_create_find_delete_chirp() {
        use crate::core::db::models::CreateUser;
        use crate::core::db::repositories::{UserRepository, UserStore};

        let config = crate::core::db::DbConfig::from_env().expect("DATABASE_URL must be set");
        let pool = crate::core::db::create_pool_with_migrations(&config)
            .await
            .expect("Failed to create pool");
        let users = UserRepository::new(pool.clone());
        let repo = ChirpRepository::new(pool);

        let user = users
            .create(&CreateUser {
                email: format!("chirper_{}@example.com", Uuid::new_v4()),
                hashed_password: "hash".to_string(),
            })
            .await
            .unwrap();

        let chirp = repo
            .create(&CreateChirp {
                body: "hello world".to_string(),
                user_id: user.id,
            })
            .await
            .unwrap();

        assert_eq!(repo.find_by_id(chirp.id).await.unwrap(), Some(chirp.clone()));
        assert!(repo.delete(chirp.id).await.unwrap());
        assert!(repo.find_by_id(chirp.id).await.unwrap().is_none());
        assert!(!repo.delete(chirp.id).await.unwrap());
    }
}
