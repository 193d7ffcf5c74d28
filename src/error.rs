//! Error types used by the jobvisor controller, its jobs, and the order-restorer chain.
//!
//! This module defines three error enums:
//!
//! - [`ControllerError`] - errors raised by the controller itself (construction, final result).
//! - [`JobError`] - errors returned by individual job bodies.
//! - [`OrderError`] - errors returned while waiting on an [`OrderRestorer`](crate::OrderRestorer).
//!
//! Each type provides `as_label` for logs.

use thiserror::Error;

/// # Errors produced by the controller.
///
/// `InvalidLimit` is returned at construction time, before any background
/// loop is spawned. `JobsFailed` is returned by [`Controller::wait`](crate::Controller::wait)
/// when at least one job reported a failure; the details are in
/// [`Controller::errors`](crate::Controller::errors).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// Concurrency limit must be at least 1.
    #[error("invalid concurrency limit {limit}: must be at least 1")]
    InvalidLimit {
        /// The rejected limit.
        limit: usize,
    },

    /// One or more jobs returned an error.
    #[error("error running the jobs")]
    JobsFailed,
}

impl ControllerError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use jobvisor::ControllerError;
    ///
    /// assert_eq!(ControllerError::JobsFailed.as_label(), "controller_jobs_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ControllerError::InvalidLimit { .. } => "controller_invalid_limit",
            ControllerError::JobsFailed => "controller_jobs_failed",
        }
    }
}

/// # Errors returned by job bodies.
///
/// [`JobError::ShuttingDown`] is the cooperative-stop sentinel: a job that
/// observed shutdown and stopped early returns it, and the controller does
/// not count it as a failure. Everything else is recorded.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// Job observed shutdown and stopped cooperatively.
    #[error("shutting down")]
    ShuttingDown,

    /// Job failed; the message is what ends up in the aggregated error list.
    #[error("{error}")]
    Fail {
        /// The failure message.
        error: String,
    },
}

impl JobError {
    /// Builds a [`JobError::Fail`] from anything printable.
    pub fn fail(error: impl Into<String>) -> Self {
        JobError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            JobError::ShuttingDown => "job_shutting_down",
            JobError::Fail { .. } => "job_failed",
        }
    }

    /// Indicates whether the error is the cooperative-stop sentinel.
    ///
    /// # Example
    /// ```
    /// use jobvisor::JobError;
    ///
    /// assert!(JobError::ShuttingDown.is_shutdown());
    /// assert!(!JobError::fail("boom").is_shutdown());
    /// ```
    pub fn is_shutdown(&self) -> bool {
        matches!(self, JobError::ShuttingDown)
    }
}

impl From<String> for JobError {
    fn from(error: String) -> Self {
        JobError::Fail { error }
    }
}

impl From<&str> for JobError {
    fn from(error: &str) -> Self {
        JobError::fail(error)
    }
}

/// # Errors returned by the order-restorer chain.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderError {
    /// The controller shut down before the predecessor finished.
    #[error("already finished")]
    ControllerFinished,
}

impl OrderError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            OrderError::ControllerFinished => "order_controller_finished",
        }
    }
}
