//! Database module for Chirpy
//!
//! Connection pool, entity models, the storage contracts with their
//! PostgreSQL repositories, and an in-memory store implementing the same
//! contracts.

pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used items
pub use memory::MemoryStore;
pub use models::*;
pub use pool::{DbConfig, DbError, create_pool, create_pool_with_migrations};
pub use repositories::{
    ChirpRepository, ChirpRepositoryError, ChirpStore, RefreshTokenRepository,
    RefreshTokenStoreError, RevocableTokenStore, UserRepository, UserRepositoryError, UserStore,
};

pub use sqlx::PgPool;
