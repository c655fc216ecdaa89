//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT)
//! - Translate signals and the internal broadcast into one shutdown event
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - The broadcast channel lets tests and embedders stop the server
//!   without delivering a real signal

use tokio::sync::broadcast;

/// Resolve when the process should shut down: SIGINT, SIGTERM, or an
/// internal trigger, whichever comes first.
pub async fn wait_for_shutdown(mut shutdown: broadcast::Receiver<()>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("SIGINT received"),
        _ = terminate => tracing::info!("SIGTERM received"),
        _ = shutdown.recv() => tracing::info!("Shutdown triggered"),
    }
}
