//! Auth API endpoints
//!
//! Provides REST API endpoints for authentication:
//! - POST /api/users - Register a new user
//! - PUT /api/users - Change email and password of the current user
//! - POST /api/login - Login and get tokens
//! - POST /api/refresh - Get a new access token for a refresh token
//! - POST /api/revoke - Logout (revoke refresh token)

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use std::sync::Arc;

use crate::core::auth::guard::{authenticate, extract_bearer_token};
use crate::core::auth::{AuthError, LoginRequest, RegisterRequest, SessionService, UpdateUserRequest};
use crate::core::db::models::UserResponse;

/// Auth API state containing the session service
#[derive(Clone)]
pub struct AuthApiState {
    pub session_service: SessionService,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Convert AuthError to API response
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Unknown email and wrong password must look the same to a client
            AuthError::BadCredential | AuthError::NotFound => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Incorrect email or password".to_string(),
            ),
            AuthError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string())
            }
            AuthError::MalformedHeader => {
                (StatusCode::UNAUTHORIZED, "MALFORMED_HEADER", self.to_string())
            }
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string()),
            AuthError::EmailAlreadyExists => (StatusCode::CONFLICT, "EMAIL_EXISTS", self.to_string()),
            AuthError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", self.to_string()),
            AuthError::InternalError(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiError::new(message, code))).into_response()
    }
}

/// Response for a successful login
#[derive(Debug, Serialize)]
pub struct LoginApiResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

/// Response for token refresh
#[derive(Debug, Serialize)]
pub struct RefreshApiResponse {
    pub token: String,
}

/// Create the auth API router
pub fn auth_api_router(state: AuthApiState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/users", post(register_handler).put(update_user_handler))
        .route("/api/login", post(login_handler))
        .route("/api/refresh", post(refresh_handler))
        .route("/api/revoke", post(revoke_handler))
        .with_state(state)
}

/// POST /api/users
/// Register a new user
async fn register_handler(
    State(state): State<Arc<AuthApiState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AuthError> {
    tracing::info!("Registration attempt for email: {}", request.email);

    let user = state.session_service.register(request).await?;

    tracing::info!("User registered successfully: {}", user.id);

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// PUT /api/users
/// Replace email and password of the authenticated user
async fn update_user_handler(
    State(state): State<Arc<AuthApiState>>,
    headers: HeaderMap,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AuthError> {
    let user_id = authenticate(&headers, state.session_service.codec())?;

    let user = state.session_service.update_identity(user_id, request).await?;

    tracing::info!("Credentials updated for user: {}", user.id);

    Ok(Json(user.into()))
}

/// POST /api/login
/// Login and get access/refresh tokens
async fn login_handler(
    State(state): State<Arc<AuthApiState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginApiResponse>, AuthError> {
    tracing::info!("Login attempt for email: {}", request.email);

    let session = state.session_service.login(request).await.inspect_err(|e| {
        if matches!(e, AuthError::NotFound | AuthError::BadCredential) {
            tracing::debug!("Login rejected: {}", e);
        }
    })?;

    tracing::info!("User logged in successfully: {}", session.user.id);

    Ok(Json(LoginApiResponse {
        user: session.user.into(),
        token: session.access_token,
        refresh_token: session.refresh_token.token,
    }))
}

/// POST /api/refresh
/// Issue a new access token for the bearer refresh token
async fn refresh_handler(
    State(state): State<Arc<AuthApiState>>,
    headers: HeaderMap,
) -> Result<Json<RefreshApiResponse>, AuthError> {
    tracing::debug!("Token refresh request");

    let refresh_token = extract_bearer_token(&headers)?;
    let token = state.session_service.refresh(&refresh_token).await?;

    Ok(Json(RefreshApiResponse { token }))
}

/// POST /api/revoke
/// Revoke the bearer refresh token
async fn revoke_handler(
    State(state): State<Arc<AuthApiState>>,
    headers: HeaderMap,
) -> Result<StatusCode, AuthError> {
    tracing::info!("Logout request");

    let refresh_token = extract_bearer_token(&headers)?;
    state.session_service.revoke(&refresh_token).await?;

    Ok(StatusCode::NO_CONTENT)
}
