//! # Job trait.
//!
//! A [`Job`] is consumed when it runs. It receives the [`Controller`] so it
//! can watch for shutdown and launch further jobs.

use async_trait::async_trait;

use crate::core::Controller;
use crate::error::JobError;

/// # Unit of work executed by a controller.
///
/// Implementations should check [`Controller::is_shutting_down`] (or await
/// [`Controller::shutting_down`]) and return promptly once shutdown is
/// requested. Returning [`JobError::ShuttingDown`] marks a clean stop.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use jobvisor::{Controller, Job, JobError};
///
/// struct Fetch {
///     url: String,
/// }
///
/// #[async_trait]
/// impl Job for Fetch {
///     async fn run(self, ctl: Controller) -> Result<(), JobError> {
///         if ctl.is_shutting_down() {
///             return Err(JobError::ShuttingDown);
///         }
///         // fetch self.url...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Job: Send + 'static {
    /// Runs the job to completion.
    async fn run(self, ctl: Controller) -> Result<(), JobError>;
}
