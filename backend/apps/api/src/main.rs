//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::net::SocketAddr;

use anyhow::Context;
use api::build_router;
use api::config::{AppConfig, AppEnv};
use auth::{AuthAppState, HttpEmailClient, LogEmailClient, Mailer, PgUserRepository};
use chrono::Utc;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::signal;
use tours::{PgTourRepository, ToursAppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,tours=info,kernel=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(env = %config.env(), "Configuration loaded");

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(config.database.url.expose_secret())
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let mailer = match &config.mail_api {
        Some(mail_api) => Mailer::Http(HttpEmailClient::new(
            &mail_api.url,
            config.sender.clone(),
            mail_api.token.clone(),
        )?),
        None if config.env() == AppEnv::Production => {
            anyhow::bail!("MAIL_API_URL and MAIL_API_TOKEN are required in production");
        }
        None => {
            tracing::warn!("No mail API configured, emails will only be logged");
            if config.env().is_development() {
                Mailer::Log(LogEmailClient::with_body())
            } else {
                Mailer::Log(LogEmailClient::new())
            }
        }
    };

    let auth_state = AuthAppState::new(PgUserRepository::new(pool.clone()), mailer, config.auth.clone())?;
    let tours_state = ToursAppState::new(PgTourRepository::new(pool.clone()));

    // Build router
    let app = build_router(&config.http, tours_state, auth_state, Utc::now());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
