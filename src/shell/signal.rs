use futures::future::{self, Either};
use tracing::{debug, warn};

/// Completes when the process is asked to shut down (Ctrl-C, or SIGTERM on unix).
///
/// If the handlers cannot be installed the future never completes, so the
/// session keeps running without autosave.
pub async fn shutdown_signal() {
    let interrupt = std::pin::pin!(compio::signal::ctrl_c());
    let terminate = std::pin::pin!(terminate());

    match future::select(interrupt, terminate).await {
        Either::Left((Ok(()), _)) | Either::Right((Ok(()), _)) => {
            debug!("Shutdown signal received");
        }
        Either::Left((Err(e), _)) | Either::Right((Err(e), _)) => {
            warn!("Failed to listen for shutdown signals: {}", e);
            future::pending::<()>().await;
        }
    }
}

#[cfg(unix)]
async fn terminate() -> std::io::Result<()> {
    compio::signal::unix::signal(libc::SIGTERM).await
}

#[cfg(not(unix))]
async fn terminate() -> std::io::Result<()> {
    future::pending().await
}
