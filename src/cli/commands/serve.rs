use std::net::SocketAddr;

use anyhow::Context;
use tracing::{info, warn};

use crate::app::{router, AppContext};
use crate::config::{AppConfig, StorageBackend};
use crate::database::Database;

pub async fn handle(mut config: AppConfig, port: Option<u16>, in_memory: bool) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    if in_memory {
        config.database.backend = StorageBackend::Memory;
    }
    config.validate().context("invalid configuration")?;

    if config.is_production() && !config.security.require_https {
        warn!("Session cookies are not marked Secure in production");
    }

    info!("Starting VidHub API in {:?} mode", config.environment);

    let database = Database::connect(&config.database)
        .await
        .context("failed to open storage")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid HOST/PORT")?;

    let memory_backend = config.database.backend == StorageBackend::Memory;
    let state = AppContext::new(config, database);

    let admin = state
        .bootstrap_admin()
        .await
        .context("failed to create the startup admin")?;
    if admin.is_none() && memory_backend {
        warn!("In-memory store has no admin; set ADMIN_USERNAME and ADMIN_PASSWORD to create one");
    }

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
        }
    };

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
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        info!("Received Ctrl+C, shutting down...");
    }
}
