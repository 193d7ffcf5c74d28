//! # Run a single job body.
//!
//! Executes one [`Job`] and turns a panic into a recorded failure, so a
//! panicking body still completes its counter and never stalls the
//! controller.
//!
//! ## Rules
//! - `Ok(())` and `Err(JobError::ShuttingDown)` are clean exits
//! - A panic becomes `Err(JobError::Fail { error: "job panicked" })`

use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::core::Controller;
use crate::error::JobError;
use crate::jobs::Job;

/// Message recorded for a job whose body panicked.
pub(crate) const PANIC_MESSAGE: &str = "job panicked";

/// Runs `job` to completion, catching panics.
pub(crate) async fn run_job<J: Job>(job: J, ctl: Controller) -> Result<(), JobError> {
    match AssertUnwindSafe(job.run(ctl)).catch_unwind().await {
        Ok(res) => res,
        Err(_panic) => Err(JobError::fail(PANIC_MESSAGE)),
    }
}
