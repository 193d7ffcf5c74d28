//! # Error collection loop.
//!
//! Receives failure messages in completion order and appends each one to the
//! shared list as it arrives, so a hard finish still reports what was
//! collected. Once the accounting loop reports the pools drained, the
//! receiver is closed (late senders get an error and drop their message),
//! buffered messages are drained, and the finish signal fires.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::logging::LoggerRef;

/// Runs until `drained` fires, then cancels `finish`.
pub(crate) async fn run(
    mut rx: mpsc::UnboundedReceiver<String>,
    drained: CancellationToken,
    finish: CancellationToken,
    errors: Arc<Mutex<Vec<String>>>,
    log: LoggerRef,
) {
    let push = |msg: String| {
        errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(msg);
    };

    loop {
        tokio::select! {
            biased;
            msg = rx.recv() => match msg {
                Some(msg) => push(msg),
                None => break,
            },
            _ = drained.cancelled() => break,
        }
    }

    rx.close();
    while let Some(msg) = rx.recv().await {
        push(msg);
    }

    let total = errors.lock().unwrap_or_else(PoisonError::into_inner).len();
    log.debug(format_args!("collected {total} job error(s)"));
    finish.cancel();
}
