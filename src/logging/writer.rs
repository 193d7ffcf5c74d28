//! # Simple stdout logger for debugging and demos.
//!
//! ## Output format
//! ```text
//! [debug] main=1 limited=2 background=0
//! [info] shutdown requested
//! [warn] limited job skipped: controller shutting down
//! ```

use std::fmt;

use super::logger::{Level, Logger};

/// Stdout logger.
///
/// Enabled via the `logging` feature. Not intended for production use;
/// use [`TracingLogger`](crate::TracingLogger) or a custom [`Logger`].
#[derive(Clone, Copy, Debug)]
pub struct LogWriter {
    min: Level,
}

impl LogWriter {
    /// Prints every message.
    pub fn new() -> Self {
        Self { min: Level::Debug }
    }

    /// Prints messages at `min` or above.
    pub fn with_min_level(min: Level) -> Self {
        Self { min }
    }
}

impl Default for LogWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for LogWriter {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if level >= self.min {
            println!("[{level}] {args}");
        }
    }
}
