//! API Server Entry Point
//!
//! Loads configuration once, connects to PostgreSQL, runs migrations and
//! serves the identity routes. Uses `anyhow` for startup errors;
//! request-level errors are rendered as problem JSON by the identity handlers.

use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    Router, http,
    http::{Method, header},
};
use identity::{IdentityAppState, IdentityConfig, PgUserRepository, SmtpConfig, SmtpOtpMailer};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,identity=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let repo = PgUserRepository::new(pool.clone());

    // Startup cleanup: errors here should not prevent server startup
    if let Err(e) = repo.purge_expired_otps().await {
        tracing::warn!(error = %e, "OTP cleanup failed, continuing anyway");
    }

    let config = identity_config()?;
    let mailer = SmtpOtpMailer::new(&smtp_config())?.with_otp_validity(config.otp_validity());

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router
    let state = IdentityAppState::new(repo, mailer, config);
    let app = Router::new()
        .merge(identity::identity_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:5000".to_string())
        .parse()
        .context("BIND_ADDR must be host:port")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Signing secrets are mandatory in release builds; debug builds fall back
/// to per-process random keys
fn identity_config() -> anyhow::Result<IdentityConfig> {
    let mut config = if cfg!(debug_assertions) {
        IdentityConfig::development()
    } else {
        IdentityConfig::default()
    };

    match read_secret("TOKEN_SECRET")? {
        Some(secret) => config.token_secret = secret,
        None if cfg!(debug_assertions) => {}
        None => anyhow::bail!("TOKEN_SECRET must be set in production"),
    }
    match read_secret("OTP_SECRET")? {
        Some(secret) => config.otp_secret = secret,
        None if cfg!(debug_assertions) => {}
        None => anyhow::bail!("OTP_SECRET must be set in production"),
    }

    if let Ok(days) = env::var("TOKEN_TTL_DAYS") {
        let days: u64 = days.trim().parse().context("TOKEN_TTL_DAYS must be a number")?;
        config.token_ttl = IdentityConfig::token_ttl_from_days(days).with_context(|| {
            format!(
                "TOKEN_TTL_DAYS must be between 1 and {}",
                IdentityConfig::MAX_TOKEN_TTL_DAYS
            )
        })?;
    }

    config.password_pepper = env::var("PASSWORD_PEPPER")
        .ok()
        .filter(|p| !p.is_empty())
        .map(String::into_bytes);

    Ok(config)
}

/// Base64 encoded 32-byte key
fn read_secret(name: &str) -> anyhow::Result<Option<[u8; 32]>> {
    let Ok(encoded) = env::var(name) else {
        return Ok(None);
    };
    let bytes = platform::crypto::from_base64(&encoded)
        .with_context(|| format!("{name} must be base64"))?;
    let secret: [u8; 32] = bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("{name} must decode to exactly 32 bytes"))?;
    Ok(Some(secret))
}

fn smtp_config() -> SmtpConfig {
    SmtpConfig {
        host: env::var("SMTP_HOST").unwrap_or_default(),
        port: env::var("SMTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(587),
        starttls: env::var("SMTP_STARTTLS")
            .map(|v| !matches!(v.trim(), "false" | "0" | "no"))
            .unwrap_or(true),
        username: env::var("SMTP_USERNAME").ok().filter(|u| !u.is_empty()),
        password: env::var("SMTP_PASSWORD").ok(),
        from: env::var("SMTP_FROM")
            .unwrap_or_else(|_| "Job Tracker <no-reply@localhost>".to_string()),
    }
}
