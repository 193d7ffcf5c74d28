//! # `tracing` bridge.
//!
//! [`TracingLogger`] forwards controller diagnostics to the `tracing`
//! macros under the `jobvisor` target, so they show up in whatever
//! subscriber the application installed.

use std::fmt;

use super::logger::{Level, Logger};

/// Logger that emits `tracing` events.
///
/// `Fatal` has no `tracing` counterpart; it is emitted at `ERROR` with a
/// `fatal = true` field.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        match level {
            Level::Debug => tracing::debug!(target: "jobvisor", "{args}"),
            Level::Info => tracing::info!(target: "jobvisor", "{args}"),
            Level::Warn => tracing::warn!(target: "jobvisor", "{args}"),
            Level::Error => tracing::error!(target: "jobvisor", "{args}"),
            Level::Fatal => tracing::error!(target: "jobvisor", fatal = true, "{args}"),
        }
    }
}
