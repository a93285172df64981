mod config;

use std::sync::Arc;

use tracing::info;

use portal_api::{AppState, AppStateInner, cors_layer, router};
use portal_db::{Database, SeedData};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "portal=debug,portal_api=debug,portal_db=debug,tower_http=debug".into()
            }),
        )
        .init();

    let cfg = Config::from_env()?;

    // A bad seed document stops startup before the store is touched.
    let seed = match &cfg.seed_path {
        Some(path) => {
            info!("Loading seed data from {}", path.display());
            SeedData::from_path(path)?
        }
        None => SeedData::bundled()?,
    };

    info!("Setting up the database...");
    let db = Database::open(&cfg.db_path)?;
    db.seed(&seed)?;

    let cors = cors_layer(&cfg.cors_origins)?;
    let state: AppState = Arc::new(AppStateInner { db, seed });
    let app = router(state, cors);

    info!("Portal server listening on {}", cfg.addr);
    info!("CORS origins: {}", cfg.cors_origins.join(", "));

    let listener = tokio::net::TcpListener::bind(cfg.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("App shutdown");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
