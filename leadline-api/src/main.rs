//! # Leadline API Server
//!
//! Serves the public marketing-site endpoints (contact form, analytics
//! beacon) and the session-gated admin dashboard API.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p leadline-api
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use leadline_api::{app, config::Config};
use leadline_shared::{
    db::{migrations, pool},
    mailer::{HttpMailer, Mailer, NoopMailer},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leadline_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Leadline API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    migrations::ensure_database_exists(&config.database.url).await?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    let mailer: Arc<dyn Mailer> = match &config.mail {
        Some(mail) => Arc::new(HttpMailer::new(mail.endpoint.clone(), mail.api_key.clone())),
        None => {
            tracing::warn!("No mail provider configured; reset emails will be logged only");
            Arc::new(NoopMailer)
        }
    };

    let bind_address = config.bind_address();
    let state = app::AppState::new(db, config, mailer);
    let router = app::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install shutdown handler");
    }
    tracing::info!("Shutdown signal received, draining...");
}
