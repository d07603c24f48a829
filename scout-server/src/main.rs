use anyhow::Context;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scout_server::{
    auth::AuthPolicy, build_router, config, credentials::BcryptHasher, db,
    db::repositories::InfluencerRepository, seed, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scout_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load settings
    let settings = config::Settings::new().context("Failed to load settings")?;

    // Initialize database
    let db = db::Database::new(&settings.database.path).context("Failed to create database")?;
    db.initialize()
        .context("Failed to initialize database schema")?;
    tracing::info!("Database initialized at {}", settings.database.path);

    let policy = AuthPolicy::from(&settings.auth);
    if settings.seed.demo {
        let hasher = BcryptHasher::new(policy.password_cost);
        let report = seed::seed_demo(&db, &hasher).context("Failed to seed demo data")?;
        tracing::info!(
            "Demo data seeded: {} influencers, login as {}",
            report.influencers,
            seed::DEMO_USER_EMAIL
        );
    }

    let catalog_size = InfluencerRepository::new(db.pool.clone())
        .count()
        .context("Failed to count influencers")?;
    if catalog_size == 0 {
        tracing::warn!("Influencer catalog is empty; run scout-seed or set SEED_DEMO=true");
    } else {
        tracing::info!("Catalog holds {} influencers", catalog_size);
    }

    // Create application state
    let state = AppState::new(db, policy);

    // Expired sessions are otherwise only removed when presented
    match state.session_manager.cleanup_expired_sessions() {
        Ok(0) => tracing::info!("No expired sessions to clean up"),
        Ok(count) => tracing::info!("Cleaned up {} expired sessions on startup", count),
        Err(e) => tracing::error!("Failed to cleanup expired sessions on startup: {:#}", e),
    }

    let app = build_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Failed to parse server address")?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
