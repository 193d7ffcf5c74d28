//! # Cross-platform OS signal handling.
//!
//! Provides [`ShutdownSignals`] (a reusable listener) and
//! [`wait_for_shutdown_signal`] (a one-shot helper), plus the controller's
//! two-stage listener: first signal requests a graceful shutdown, second
//! declares the controller finished without waiting for jobs.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use tokio_util::sync::CancellationToken;

use crate::logging::LoggerRef;

/// Registered termination-signal listeners.
///
/// Registering once and calling [`recv`](Self::recv) repeatedly means a
/// second signal is not lost between two waits.
#[derive(Debug)]
pub struct ShutdownSignals {
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigquit: tokio::signal::unix::Signal,
}

impl ShutdownSignals {
    /// Registers the listeners.
    ///
    /// # Errors
    /// Returns `Err` if signal registration fails.
    #[cfg(unix)]
    pub fn new() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigquit: signal(SignalKind::quit())?,
        })
    }

    /// Registers the listeners.
    ///
    /// # Errors
    /// Never fails off Unix; the signature matches the Unix variant.
    #[cfg(not(unix))]
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Waits for the next termination signal.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> std::io::Result<()> {
        tokio::select! {
            _ = self.sigint.recv()  => {},
            _ = self.sigterm.recv() => {},
            _ = self.sigquit.recv() => {},
        }
        Ok(())
    }

    /// Waits for the next termination signal.
    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> std::io::Result<()> {
        tokio::signal::ctrl_c().await
    }
}

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    ShutdownSignals::new()?.recv().await
}

/// Spawns the two-stage signal listener for one controller.
///
/// Holds only the two tokens and exits as soon as `finish` fires.
pub(crate) fn spawn_listener(
    shutdown: CancellationToken,
    finish: CancellationToken,
    log: LoggerRef,
) {
    tokio::spawn(async move {
        let mut signals = match ShutdownSignals::new() {
            Ok(signals) => signals,
            Err(e) => {
                log.error(format_args!("signal listener disabled: {e}"));
                return;
            }
        };

        tokio::select! {
            _ = finish.cancelled() => return,
            res = signals.recv() => if let Err(e) = res {
                log.error(format_args!("signal listener failed: {e}"));
                return;
            },
        }
        log.info(format_args!("gracefully shutting down..."));
        shutdown.cancel();

        tokio::select! {
            _ = finish.cancelled() => return,
            res = signals.recv() => if let Err(e) = res {
                log.error(format_args!("signal listener failed: {e}"));
                return;
            },
        }
        log.warn(format_args!("second signal, finishing without waiting for jobs"));
        finish.cancel();
    });
}
