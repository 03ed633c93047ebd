//! Database repositories for Chirpy
//!
//! Each repository implements a narrow storage contract (`UserStore`,
//! `ChirpStore`, `RevocableTokenStore`) so that services can run against
//! PostgreSQL or the in-memory store interchangeably.

pub mod chirp;
pub mod refresh_token;
pub mod user;

pub use chirp::{ChirpRepository, ChirpRepositoryError, ChirpStore};
pub use refresh_token::{RefreshTokenRepository, RefreshTokenStoreError, RevocableTokenStore};
pub use user::{UserRepository, UserRepositoryError, UserStore};
