//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use anyhow::Context;
use auth::{AuthConfig, MemoryAuthRepository, PgAuthRepository, SessionRepository};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

/// How often expired sessions are swept
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_auth_config()?;

    let app = match env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await
                .context("failed to connect to database")?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            let repo = PgAuthRepository::new(pool);
            spawn_session_sweeper(repo.clone());
            auth::auth_router(repo, config)
        }
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on exit");

            let repo = MemoryAuthRepository::new();
            spawn_session_sweeper(repo.clone());
            auth::auth_router_generic(repo, config)
        }
        Err(_) => anyhow::bail!("DATABASE_URL must be set in environment"),
    };

    let app = app.layer(TraceLayer::new_for_http());

    // Start server
    let port = match env::var("PORT") {
        Ok(port) => port.parse().context("PORT must be a port number")?,
        Err(_) => DEFAULT_PORT,
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the auth configuration from the environment
fn load_auth_config() -> anyhow::Result<AuthConfig> {
    let mut config = match env::var("SESSION_SECRET") {
        Ok(phrase) => AuthConfig::from_secret_phrase(&phrase),
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("SESSION_SECRET not set, sessions will not survive a restart");
            AuthConfig::development()
        }
        Err(_) => anyhow::bail!("SESSION_SECRET must be set in production"),
    };

    config.cookie_secure = env::var("COOKIE_SECURE")
        .map(|v| matches!(v.as_str(), "true" | "1"))
        .unwrap_or(false);

    Ok(config)
}

/// Remove expired sessions now and then on a fixed interval
///
/// Errors are logged and the sweep retried on the next tick.
fn spawn_session_sweeper<R>(repo: R)
where
    R: SessionRepository + Send + Sync + 'static,
{
    tokio::spawn(async move {
        // The first tick completes immediately, giving the startup sweep
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);

        loop {
            interval.tick().await;

            if let Err(e) = repo.cleanup_expired().await {
                tracing::warn!(
                    error = %e,
                    "Session cleanup failed, retrying on next interval"
                );
            }
        }
    });
}
