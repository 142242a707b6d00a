use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod database;
mod error;
mod jwt;
mod middleware;
mod models;
mod password;
mod repositories;
mod routes;
mod services;
mod settings;
mod state;
mod validation;

use common::database::{health_check, init_pool};

use crate::{
    jwt::JwtService, password::PasswordService, repositories::PgStorage, settings::Settings,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env().context("Failed to load settings")?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.server.mode.default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting events API in {:?} mode", settings.server.mode);

    // Initialize database connection pool
    let pool = init_pool(&settings.database).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    if settings.auto_migrate {
        database::run_migrations(&pool).await?;
    } else {
        warn!("Automatic migrations disabled");
    }

    let passwords = PasswordService::new()?;
    let jwt_service = JwtService::new(settings.jwt.clone());
    let app_state = AppState::new(PgStorage::new(pool), passwords, jwt_service);

    // Start the web server
    let app = routes::create_router(app_state, settings.server.request_timeout);

    let address = settings.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Events API listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Events API stopped");
    Ok(())
}

/// Resolve once Ctrl-C or SIGTERM is received
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
