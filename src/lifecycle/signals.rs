//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT)
//! - Resolve once the process has been asked to stop
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handler registration failures are returned, not panicked on

/// Wait for a `SIGTERM` or `SIGINT` on UNIX systems.
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate())?;
    let mut int = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = term.recv() => tracing::info!("Received SIGTERM"),
        _ = int.recv() => tracing::info!("Received SIGINT"),
    }
    Ok(())
}

/// Wait for `ctrl+c` on other platforms.
#[cfg(not(unix))]
pub async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Received SIGINT");
    Ok(())
}
