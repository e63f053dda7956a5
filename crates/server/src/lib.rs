//! # tp-server
//!
//! HTTP front end for talepipe.
//!
//! A browser (or any poller) triggers story jobs with `/start` and follows
//! the most recent one through `/status`. The server owns no pipeline logic;
//! it forwards requests to the [`JobManager`] of `tp-core` and turns the core
//! event stream into log lines.

pub mod assets;
pub mod error;
pub mod event_log;
pub mod routes;

pub use error::ApiError;
pub use routes::{router, AppState};

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tp_core::state::JobManager;
use tracing::info;

/// Serve the HTTP API on `bind` until Ctrl-C, then cancel and await all jobs.
pub async fn serve(manager: Arc<JobManager>, bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    let local = listener
        .local_addr()
        .context("Failed to read listener address")?;
    info!(address = %local, "Listening");

    let app = router(AppState::new(Arc::clone(&manager)));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    manager.shutdown().await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
