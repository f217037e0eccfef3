//! Application builder and server runner.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::Router;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use warden_core::error::AppError;

use crate::middleware::rate_limit::RateLimiter;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Serves the API until Ctrl+C or SIGTERM, running the background tasks
/// alongside and stopping them on shutdown.
pub async fn run_server(state: AppState) -> Result<(), AppError> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);

    // ── Step 1: Background tasks ─────────────────────────────────
    let cleanup = state.token_cleanup().spawn(shutdown_rx.clone());
    let sweeper = spawn_rate_limit_sweeper(
        state.rate_limiter.clone(),
        Duration::from_secs(state.config.security.rate_limit_window_seconds.max(1)),
        shutdown_rx,
    );

    // ── Step 2: Bind ─────────────────────────────────────────────
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(addr = %addr, "Warden server listening");

    // ── Step 3: Serve ────────────────────────────────────────────
    let app = build_app(state).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 4: Drain background tasks ───────────────────────────
    drain_tasks(vec![cleanup, sweeper], grace).await;

    info!("Warden server stopped");
    Ok(())
}

/// Waits up to `grace` for the background tasks to stop, then aborts the
/// rest. Returns whether all of them finished on their own.
pub async fn drain_tasks(tasks: Vec<JoinHandle<()>>, grace: Duration) -> bool {
    let aborts: Vec<_> = tasks.iter().map(JoinHandle::abort_handle).collect();
    let drain = async {
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Background task ended abnormally");
            }
        }
    };

    match tokio::time::timeout(grace, drain).await {
        Ok(()) => true,
        Err(_) => {
            warn!(
                grace_seconds = grace.as_secs(),
                "Background tasks still running after grace period, aborting"
            );
            for handle in aborts {
                handle.abort();
            }
            false
        }
    }
}

fn spawn_rate_limit_sweeper(
    limiter: RateLimiter,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    limiter.sweep(Instant::now());
                    debug!(clients = limiter.tracked_clients(), "Rate limiter swept");
                }
                _ = shutdown.changed() => break,
            }
        }
    })
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_waits_for_finished_tasks() {
        let quick = tokio::spawn(async {});
        assert!(drain_tasks(vec![quick], Duration::from_secs(5)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_gives_up_after_grace() {
        let stuck = tokio::spawn(std::future::pending::<()>());
        assert!(!drain_tasks(vec![stuck], Duration::from_secs(30)).await);
    }
}
