//! # Accounting loop: the single owner of the job counters.
//!
//! Every launch and every completion is sent here as a [`Tally`]. The loop
//! applies it and re-evaluates two conditions, in this order:
//!
//! ```text
//! recv(Tally) ──► apply to counters
//!                 ├─► main + limited == 0          → shutdown.cancel()
//!                 └─► main + limited + background == 0
//!                     && shutdown is set           → drained.cancel(), exit
//! ```
//!
//! Main and limited start at 1: [`Controller::wait`](crate::Controller::wait)
//! contributes the matching completions, so nothing drains before a caller waits.
//! Background jobs keep the loop alive but never keep shutdown from firing.

use std::fmt;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::logging::LoggerRef;

/// Admission category of a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Pool {
    /// Unrestricted jobs (`go`, `run_blocking`).
    Main,
    /// Jobs gated by the admission semaphore.
    Limited,
    /// Supervisory jobs; their failure always shuts down.
    Background,
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pool::Main => "main",
            Pool::Limited => "limited",
            Pool::Background => "background",
        })
    }
}

/// One counter movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tally {
    Launched(Pool),
    Completed(Pool),
}

/// Outstanding jobs per pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Counters {
    main: i64,
    limited: i64,
    background: i64,
}

impl Counters {
    /// Counters with the waiter bias on main and limited.
    pub(crate) fn biased() -> Self {
        Self {
            main: 1,
            limited: 1,
            background: 0,
        }
    }

    pub(crate) fn apply(&mut self, tally: Tally) {
        let (pool, step) = match tally {
            Tally::Launched(pool) => (pool, 1),
            Tally::Completed(pool) => (pool, -1),
        };
        match pool {
            Pool::Main => self.main += step,
            Pool::Limited => self.limited += step,
            Pool::Background => self.background += step,
        }
    }

    /// Jobs that keep the controller from shutting down on its own.
    pub(crate) fn foreground(&self) -> i64 {
        self.main + self.limited
    }

    pub(crate) fn total(&self) -> i64 {
        self.main + self.limited + self.background
    }
}

/// Runs until the pools drain after shutdown (or every sender is gone).
pub(crate) async fn run(
    mut rx: mpsc::UnboundedReceiver<Tally>,
    shutdown: CancellationToken,
    drained: CancellationToken,
    log: LoggerRef,
) {
    let mut counters = Counters::biased();

    while let Some(tally) = rx.recv().await {
        counters.apply(tally);
        log.debug(format_args!(
            "main={} limited={} background={}",
            counters.main, counters.limited, counters.background
        ));

        if counters.foreground() == 0 && !shutdown.is_cancelled() {
            log.info(format_args!("main and limited pools empty, shutting down"));
            shutdown.cancel();
        }

        if counters.total() == 0 && shutdown.is_cancelled() {
            log.debug(format_args!("all pools drained, closing error collection"));
            drained.cancel();
            return;
        }
    }
}
