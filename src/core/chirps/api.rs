//! Chirp API endpoints
//!
//! Provides REST API endpoints for chirps:
//! - POST /api/chirps - Create a chirp (auth required)
//! - GET /api/chirps - List all chirps, oldest first
//! - GET /api/chirps/{id} - Get chirp by ID
//! - DELETE /api/chirps/{id} - Delete a chirp (owner only)

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::auth::{ApiError, AuthError, TokenCodec, authenticate, authorize_ownership};
use crate::core::chirps::content::{ValidationError, clean_body};
use crate::core::db::models::{Chirp, CreateChirp};
use crate::core::db::repositories::{ChirpRepositoryError, ChirpStore};

/// Chirp API state containing the chirp store and token codec
#[derive(Clone)]
pub struct ChirpApiState {
    pub chirp_store: Arc<dyn ChirpStore>,
    pub codec: Arc<dyn TokenCodec>,
}

/// Chirp API error types
#[derive(Debug, thiserror::Error)]
pub enum ChirpApiError {
    #[error("Chirp not found")]
    NotFound,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<ChirpRepositoryError> for ChirpApiError {
    fn from(err: ChirpRepositoryError) -> Self {
        match err {
            ChirpRepositoryError::NotFound => ChirpApiError::NotFound,
            ChirpRepositoryError::DatabaseError(e) => ChirpApiError::InternalError(e.to_string()),
        }
    }
}

impl IntoResponse for ChirpApiError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            ChirpApiError::NotFound => (StatusCode::NOT_FOUND, "CHIRP_NOT_FOUND"),
            ChirpApiError::Validation(ValidationError::TooLong) => {
                (StatusCode::BAD_REQUEST, "CHIRP_TOO_LONG")
            }
            ChirpApiError::Auth(err) => return err.into_response(),
            ChirpApiError::InternalError(e) => {
                tracing::error!("Internal error: {}", e);
                let body = ApiError::new("Internal server error", "INTERNAL_ERROR");
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
            }
        };

        let body = ApiError::new(self.to_string(), code);

        (status, Json(body)).into_response()
    }
}

/// Request for creating a chirp
#[derive(Debug, Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

/// Create the chirp API router
pub fn chirp_api_router(state: ChirpApiState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/chirps", post(create_chirp).get(list_chirps))
        .route("/api/chirps/{id}", get(get_chirp).delete(delete_chirp))
        .with_state(state)
}

/// POST /api/chirps
async fn create_chirp(
    State(state): State<Arc<ChirpApiState>>,
    headers: HeaderMap,
    Json(request): Json<CreateChirpRequest>,
) -> Result<(StatusCode, Json<Chirp>), ChirpApiError> {
    let user_id = authenticate(&headers, state.codec.as_ref())?;
    let body = clean_body(&request.body)?;

    let chirp = state.chirp_store.create(&CreateChirp { body, user_id }).await?;

    tracing::info!("Chirp {} created by user {}", chirp.id, user_id);

    Ok((StatusCode::CREATED, Json(chirp)))
}

/// GET /api/chirps
async fn list_chirps(
    State(state): State<Arc<ChirpApiState>>,
) -> Result<Json<Vec<Chirp>>, ChirpApiError> {
    let chirps = state.chirp_store.list().await?;
    Ok(Json(chirps))
}

/// GET /api/chirps/{id}
async fn get_chirp(
    State(state): State<Arc<ChirpApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Chirp>, ChirpApiError> {
    let chirp = state
        .chirp_store
        .find_by_id(id)
        .await?
        .ok_or(ChirpApiError::NotFound)?;

    Ok(Json(chirp))
}

/// DELETE /api/chirps/{id}
/// Only the author may delete a chirp
async fn delete_chirp(
    State(state): State<Arc<ChirpApiState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, ChirpApiError> {
    let user_id = authenticate(&headers, state.codec.as_ref())?;

    let chirp = state
        .chirp_store
        .find_by_id(id)
        .await?
        .ok_or(ChirpApiError::NotFound)?;

    authorize_ownership(user_id, chirp.user_id)?;

    if !state.chirp_store.delete(id).await? {
        // Deleted concurrently between lookup and delete
        return Err(ChirpApiError::NotFound);
    }

    tracing::info!("Chirp {} deleted by user {}", id, user_id);

    Ok(StatusCode::NO_CONTENT)
}
