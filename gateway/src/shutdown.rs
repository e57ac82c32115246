//! Graceful shutdown signal handling.
//!
//! [`on_shutdown_signal`] spawns a listener for SIGTERM / SIGINT (Ctrl+C
//! outside Unix) and returns a [`CancellationToken`] that is cancelled when
//! the first signal arrives.

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;

/// Registers the signal handlers and returns the token they cancel.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns an [`std::io::Error`] if signal registration fails.
#[allow(clippy::unnecessary_wraps)]
pub fn on_shutdown_signal() -> Result<CancellationToken, std::io::Error> {
    let token = CancellationToken::new();
    let trigger = token.clone();

    #[cfg(unix)]
    {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("SIGTERM received, shutting down"),
                _ = sigint.recv() => tracing::info!("SIGINT received, shutting down"),
            }
            trigger.cancel();
        });
    }

    #[cfg(not(unix))]
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Ctrl+C received, shutting down");
        trigger.cancel();
    });

    Ok(token)
}
