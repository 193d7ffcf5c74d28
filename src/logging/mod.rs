//! # Pluggable diagnostics sink.
//!
//! The controller reports what it does (jobs skipped, pools drained,
//! shutdown requested) through a [`Logger`]. Logging never drives control
//! flow; swapping the sink changes output only.
//!
//! ## Sinks
//! - [`NoopLogger`] - default, discards everything
//! - [`TracingLogger`] - forwards to the `tracing` macros
//! - [`LogWriter`] - prints to stdout _(feature `logging`, demo/reference only)_
//!
//! A logger is handed to [`ControllerBuilder::with_logger`](crate::ControllerBuilder::with_logger);
//! there is no process-wide logger.

mod logger;
mod tracing_sink;
#[cfg(feature = "logging")]
mod writer;

pub use logger::{Level, Logger, LoggerRef, NoopLogger};
pub use tracing_sink::TracingLogger;
#[cfg(feature = "logging")]
pub use writer::LogWriter;
