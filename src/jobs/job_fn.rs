//! # Function-backed job (`JobFn`)
//!
//! [`JobFn`] wraps a closure `F: FnOnce(Controller) -> Fut`. The closure is
//! called once, when the job starts.
//!
//! ## Example
//! ```rust
//! use jobvisor::{Controller, JobError, JobFn};
//!
//! let job = JobFn::new(|ctl: Controller| async move {
//!     if ctl.is_shutting_down() {
//!         return Err(JobError::ShuttingDown);
//!     }
//!     Ok(())
//! });
//! # let _ = job;
//! ```

use std::future::Future;

use async_trait::async_trait;

use crate::core::Controller;
use crate::error::JobError;
use crate::jobs::job::Job;

/// Closure-backed job.
#[derive(Debug)]
pub struct JobFn<F> {
    f: F,
}

impl<F> JobFn<F> {
    /// Wraps a closure as a job.
    pub fn new<Fut>(f: F) -> Self
    where
        F: FnOnce(Controller) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), JobError>> + Send + 'static,
    {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Job for JobFn<F>
where
    F: FnOnce(Controller) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), JobError>> + Send + 'static,
{
    async fn run(self, ctl: Controller) -> Result<(), JobError> {
        (self.f)(ctl).await
    }
}
