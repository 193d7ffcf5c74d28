//! # Controller configuration.
//!
//! Provides [`ControllerConfig`], the construction-time settings for a
//! [`Controller`](crate::Controller), and the process-wide default limit.
//!
//! ## Sentinel values
//! - `limit = 0` → rejected by the builder with [`ControllerError::InvalidLimit`](crate::ControllerError::InvalidLimit)

use std::sync::atomic::{AtomicUsize, Ordering};

/// Limit used by [`ControllerConfig::default`] until overridden.
const INITIAL_DEFAULT_LIMIT: usize = 4;

static DEFAULT_LIMIT: AtomicUsize = AtomicUsize::new(INITIAL_DEFAULT_LIMIT);

/// Overrides the process-wide default concurrency limit.
///
/// Affects controllers built afterwards from [`ControllerConfig::default`];
/// already running controllers keep their limit.
pub fn set_default_limit(limit: usize) {
    DEFAULT_LIMIT.store(limit, Ordering::Relaxed);
}

/// Returns the current process-wide default concurrency limit.
pub fn default_limit() -> usize {
    DEFAULT_LIMIT.load(Ordering::Relaxed)
}

/// Construction-time settings for a controller.
///
/// ## Field semantics
/// - `limit`: capacity of the admission semaphore used by the limited pool (`>= 1`)
/// - `fail_fast`: first job error triggers shutdown (can also be enabled later)
/// - `handle_signals`: spawn the OS signal listener (first signal shuts down, second finishes)
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Maximum number of limited-pool jobs running at once.
    pub limit: usize,

    /// Shut down on the first main/limited job error.
    pub fail_fast: bool,

    /// Translate SIGINT/SIGTERM into `shutdown()` then `finish()`.
    pub handle_signals: bool,
}

impl ControllerConfig {
    /// Returns a default config with the given limit.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }
}

impl Default for ControllerConfig {
    /// Default configuration:
    ///
    /// - `limit = default_limit()` (4 unless overridden)
    /// - `fail_fast = false`
    /// - `handle_signals = true`
    fn default() -> Self {
        Self {
            limit: default_limit(),
            fail_fast: false,
            handle_signals: true,
        }
    }
}
