//! # Job abstraction.
//!
//! - [`Job`] - trait for a unit of work run by the controller
//! - [`JobFn`] - closure-backed job

mod job;
mod job_fn;

pub use job::Job;
pub use job_fn::JobFn;
