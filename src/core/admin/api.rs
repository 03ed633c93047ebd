//! Admin API endpoints
//!
//! - GET /admin/metrics - Fileserver hit count as an HTML page
//! - POST /admin/reset - Delete all users and zero the hit counter (dev only)

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;

use crate::core::auth::ApiError;
use crate::core::db::repositories::{UserRepositoryError, UserStore};
use crate::core::metrics::HitCounter;

/// Admin API state
#[derive(Clone)]
pub struct AdminApiState {
    pub hits: HitCounter,
    pub user_store: Arc<dyn UserStore>,
    /// Reset is refused unless this is set
    pub allow_reset: bool,
}

/// Admin API error types
#[derive(Debug, thiserror::Error)]
pub enum AdminApiError {
    #[error("Reset is only allowed in dev environment")]
    Forbidden,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<UserRepositoryError> for AdminApiError {
    fn from(err: UserRepositoryError) -> Self {
        AdminApiError::InternalError(err.to_string())
    }
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AdminApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                ApiError::new(self.to_string(), "FORBIDDEN"),
            ),
            AdminApiError::InternalError(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("Internal server error", "INTERNAL_ERROR"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Create the admin API router
pub fn admin_api_router(state: AdminApiState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/admin/metrics", get(metrics_handler))
        .route("/admin/reset", post(reset_handler))
        .with_state(state)
}

fn render_metrics(hits: u64) -> String {
    format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>\n",
        hits
    )
}

/// GET /admin/metrics
async fn metrics_handler(State(state): State<Arc<AdminApiState>>) -> Html<String> {
    Html(render_metrics(state.hits.load()))
}

/// POST /admin/reset
async fn reset_handler(
    State(state): State<Arc<AdminApiState>>,
) -> Result<&'static str, AdminApiError> {
    if !state.allow_reset {
        tracing::warn!("Reset refused outside dev platform");
        return Err(AdminApiError::Forbidden);
    }

    let deleted = state.user_store.delete_all().await?;
    state.hits.reset();

    tracing::info!("Reset: deleted {} users", deleted);

    Ok("Hits reset to 0 and database reset to initial state.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::MemoryStore;
    use crate::core::db::models::CreateUser;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_router(allow_reset: bool) -> (Router, HitCounter, MemoryStore) {
        let hits = HitCounter::new();
        let store = MemoryStore::new();
        let router = admin_api_router(AdminApiState {
            hits: hits.clone(),
            user_store: Arc::new(store.clone()),
            allow_reset,
        });
        (router, hits, store)
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_metrics_page() {
        let (app, hits, _) = test_router(false);
        hits.increment();
        hits.increment();

        let response = app
            .oneshot(Request::builder().uri("/admin/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"));
        assert!(body_text(response).await.contains("Chirpy has been visited 2 times!"));
    }

    #[tokio::test]
    async fn test_reset_forbidden_outside_dev() {
        let (app, hits, store) = test_router(false);
        hits.increment();
        UserStore::create(
            &store,
            &CreateUser {
                email: "walt@example.com".to_string(),
                hashed_password: "x".to_string(),
            },
        )
        .await
        .unwrap();

        let response = app.oneshot(post_request("/admin/reset")).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(hits.load(), 1);
        assert!(store.find_by_email("walt@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_reset_in_dev() {
        let (app, hits, store) = test_router(true);
        hits.increment();
        UserStore::create(
            &store,
            &CreateUser {
                email: "walt@example.com".to_string(),
                hashed_password: "x".to_string(),
            },
        )
        .await
        .unwrap();

        let response = app.oneshot(post_request("/admin/reset")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(hits.load(), 0);
        assert!(store.find_by_email("walt@example.com").await.unwrap().is_none());
    }
}
