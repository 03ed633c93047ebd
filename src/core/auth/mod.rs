//! Authentication module for Chirpy
//!
//! This module provides authentication functionality including:
//! - bcrypt password hashing
//! - JWT access token generation and validation
//! - Opaque refresh tokens with server-side revocation
//! - Bearer token extraction and ownership checks
//! - REST API endpoints for auth operations

pub mod api;
pub mod guard;
pub mod jwt;
pub mod password;
pub mod refresh;
pub mod service;

pub use api::{ApiError, AuthApiState, auth_api_router};
pub use guard::{authenticate, authorize_ownership, extract_bearer_token};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService, TokenCodec, TokenError};
pub use password::{PasswordError, PasswordHasher};
pub use refresh::{RefreshTokenError, RefreshTokenManager};
pub use service::{
    AuthError, LoginRequest, RegisterRequest, Session, SessionService, UpdateUserRequest,
};
