//! Application assembly: shared state and the top-level router

use axum::{Router, http::StatusCode, middleware, routing::get};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::core::admin::{AdminApiState, admin_api_router};
use crate::core::auth::{
    AuthApiState, JwtConfig, JwtService, PasswordHasher, RefreshTokenManager, SessionService,
    TokenCodec, auth_api_router,
};
use crate::core::chirps::{ChirpApiState, chirp_api_router};
use crate::core::config::Config;
use crate::core::db::{
    ChirpRepository, ChirpStore, MemoryStore, PgPool, RefreshTokenRepository, RevocableTokenStore,
    UserRepository, UserStore,
};
use crate::core::metrics::{HitCounter, count_hits};

/// Everything the routers need, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub hits: HitCounter,
    pub codec: Arc<dyn TokenCodec>,
    pub session_service: SessionService,
    pub user_store: Arc<dyn UserStore>,
    pub chirp_store: Arc<dyn ChirpStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        jwt_config: JwtConfig,
        hasher: PasswordHasher,
        user_store: Arc<dyn UserStore>,
        chirp_store: Arc<dyn ChirpStore>,
        token_store: Arc<dyn RevocableTokenStore>,
    ) -> Self {
        let access_token_ttl = jwt_config.access_token_ttl();
        let refresh_tokens = RefreshTokenManager::new(token_store, jwt_config.refresh_token_ttl());
        let codec: Arc<dyn TokenCodec> = Arc::new(JwtService::new(jwt_config));

        let session_service = SessionService::new(
            user_store.clone(),
            refresh_tokens,
            codec.clone(),
            hasher,
            access_token_ttl,
        );

        Self {
            config,
            hits: HitCounter::new(),
            codec,
            session_service,
            user_store,
            chirp_store,
        }
    }

    /// State backed by PostgreSQL repositories
    pub fn with_postgres(config: Config, jwt_config: JwtConfig, pool: PgPool) -> Self {
        Self::new(
            config,
            jwt_config,
            PasswordHasher::new(),
            Arc::new(UserRepository::new(pool.clone())),
            Arc::new(ChirpRepository::new(pool.clone())),
            Arc::new(RefreshTokenRepository::new(pool)),
        )
    }

    /// State backed by a process-local store. Data is lost on exit.
    pub fn in_memory(config: Config, jwt_config: JwtConfig, hasher: PasswordHasher) -> Self {
        let store = MemoryStore::new();
        Self::new(
            config,
            jwt_config,
            hasher,
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
        )
    }
}

/// GET /api/healthz
async fn healthz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Build the application router
pub fn app_router(state: AppState) -> Router {
    let fileserver = Router::new()
        .nest_service("/app", ServeDir::new(&state.config.fileserver_root))
        .layer(middleware::from_fn_with_state(state.hits.clone(), count_hits));

    let auth_api = auth_api_router(AuthApiState {
        session_service: state.session_service.clone(),
    });

    let chirp_api = chirp_api_router(ChirpApiState {
        chirp_store: state.chirp_store.clone(),
        codec: state.codec.clone(),
    });

    let admin_api = admin_api_router(AdminApiState {
        hits: state.hits.clone(),
        user_store: state.user_store.clone(),
        allow_reset: state.config.is_dev(),
    });

    Router::new()
        .route("/api/healthz", get(healthz))
        .merge(auth_api)
        .merge(chirp_api)
        .merge(admin_api)
        .merge(fileserver)
        .layer(TraceLayer::new_for_http())
}
