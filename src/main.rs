use chirpy::app::{AppState, app_router};
use chirpy::core::auth::{JwtConfig, PasswordHasher};
use chirpy::core::config::Config;
use chirpy::core::db::{DbConfig, create_pool_with_migrations};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load application config from environment variables
    let config = Config::from_env();
    let jwt_config = JwtConfig::from_env()?;

    // Log config status (without revealing secrets)
    tracing::info!(
        "Config loaded: database={}, platform={}, fileserver_root={}",
        config.has_database(),
        config.platform,
        config.fileserver_root
    );

    let state = if config.has_database() {
        let db_config = DbConfig::from_env()?;
        let pool = create_pool_with_migrations(&db_config).await?;
        AppState::with_postgres(config.clone(), jwt_config, pool)
    } else {
        tracing::warn!("DATABASE_URL not set, keeping all data in memory");
        AppState::in_memory(config.clone(), jwt_config, PasswordHasher::new())
    };

    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
