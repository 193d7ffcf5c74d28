//! # Leveled logger trait.
//!
//! [`Logger`] has a single required method, [`Logger::log`]; the per-level
//! helpers are provided. Messages are passed as [`fmt::Arguments`] so a
//! no-op sink never formats anything.
//!
//! ## Example
//! ```rust
//! use std::fmt;
//! use jobvisor::{Level, Logger};
//!
//! struct Stderr;
//!
//! impl Logger for Stderr {
//!     fn log(&self, level: Level, args: fmt::Arguments<'_>) {
//!         eprintln!("{}: {args}", level.as_str());
//!     }
//! }
//!
//! Stderr.info(format_args!("controller started with limit {}", 4));
//! ```

use std::fmt;
use std::sync::Arc;

/// Shared handle to a logger.
pub type LoggerRef = Arc<dyn Logger>;

/// Severity of a log record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Counter movements and other chatty internals.
    Debug,
    /// Lifecycle milestones (shutdown requested, finished).
    Info,
    /// Unexpected but recoverable situations.
    Warn,
    /// Errors the controller could not act on.
    Error,
    /// Errors after which the process is not expected to continue.
    Fatal,
}

impl Level {
    /// Returns a short lowercase name for the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostics sink used by the controller.
///
/// ### Implementation requirements
/// - Must be cheap and non-blocking; it is called from the accounting loop.
/// - Must not panic.
/// - `fatal` only records; it never aborts the process.
pub trait Logger: Send + Sync + 'static {
    /// Records one message at the given level.
    fn log(&self, level: Level, args: fmt::Arguments<'_>);

    /// Records a debug message.
    fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    /// Records an info message.
    fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    /// Records a warning.
    fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    /// Records an error.
    fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    /// Records a fatal error.
    fn fatal(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Fatal, args);
    }
}

/// Logger that discards every message. The default.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    #[inline]
    fn log(&self, _level: Level, _args: fmt::Arguments<'_>) {}
}
