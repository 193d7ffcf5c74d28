//! # jobvisor
//!
//! **jobvisor** is a structured-concurrency controller for Tokio.
//!
//! It supervises a dynamic, unbounded set of jobs spread over three pools
//! with different admission rules, propagates one cooperative shutdown
//! signal to all of them, aggregates their errors, and tells a waiting
//! caller, exactly once, that all work is done. An order-restoring barrier
//! chain lets jobs launched out of order re-serialize one critical step.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  go / run_   │   │ limited_go / │   │  background  │
//!     │  blocking    │   │ blocking_…   │   │              │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │                  ▼                  │
//!            │          ┌──────────────┐           │
//!            │          │  Semaphore   │           │
//!            │          │   (limit)    │           │
//!            │          └──────┬───────┘           │
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Job bodies (tokio tasks), each handed a Controller clone          │
//! └──────┬─────────────────────────────────────────────┬──────────────┘
//!        │ Tally::Launched / Tally::Completed          │ Err(..) messages
//!        ▼                                             ▼
//! ┌────────────────────────────┐      drained    ┌──────────────────┐
//! │ accounting loop            │ ──────────────► │ collector loop   │
//! │ main / limited / background│                 │ (completion      │
//! │ main+limited == 0 → shutdown                 │  order)          │
//! └────────────────────────────┘                 └────────┬─────────┘
//!                                                         ▼
//!                                                  finish → wait()
//! ```
//!
//! ### Lifecycle
//! ```text
//! Controller::new(limit) ──► spawn accounting, collector, signal listener
//!
//! launch job ──► Tally::Launched(pool) ──► spawn body
//!                                          ├─ Ok / Err(ShuttingDown) ─► Tally::Completed
//!                                          └─ Err(e) ─► error channel
//!                                                       ├─ background or fail-fast ─► shutdown
//!                                                       └─► Tally::Completed
//!
//! wait() ──► release waiter bias ──► … counters reach 0 with shutdown set
//!        ──► collector drains ──► finish ──► Ok(()) / Err(JobsFailed)
//! ```
//!
//! ## Features
//! | Area               | Description                                                  | Key types / traits                  |
//! |--------------------|--------------------------------------------------------------|-------------------------------------|
//! | **Controller**     | Launch counted jobs, shut down, wait, read errors.           | [`Controller`], [`ControllerBuilder`] |
//! | **Jobs**           | Define jobs as types or closures.                            | [`Job`], [`JobFn`]                  |
//! | **Ordering**       | Re-impose launch order on one step of concurrent jobs.       | [`OrderRestorer`]                   |
//! | **Errors**         | Typed errors for construction, jobs and ordering.            | [`ControllerError`], [`JobError`], [`OrderError`] |
//! | **Configuration**  | Limit, fail-fast, signal handling, process-wide default.     | [`ControllerConfig`], [`set_default_limit`] |
//! | **Logging**        | Pluggable leveled sink, no-op by default.                    | [`Logger`], [`TracingLogger`]       |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use jobvisor::{Controller, ControllerConfig, JobError, JobFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctl = Controller::builder(ControllerConfig::with_limit(2)).build()?;
//!
//!     // A watcher that lives until the controller shuts down.
//!     ctl.background(JobFn::new(|ctl| async move {
//!         ctl.shutting_down().await;
//!         Ok(())
//!     }));
//!
//!     for i in 0..3 {
//!         let order = ctl.next_order_restorer();
//!         ctl.limited_go(JobFn::new(move |_ctl| async move {
//!             // unordered work...
//!             order.wait().await.map_err(|e| JobError::fail(e.to_string()))?;
//!             println!("step {i}");
//!             order.finished().await.map_err(|e| JobError::fail(e.to_string()))?;
//!             Ok(())
//!         }));
//!     }
//!
//!     ctl.wait().await?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod jobs;
mod logging;
mod order_restorer;

// ---- Public re-exports ----

pub use config::{ControllerConfig, default_limit, set_default_limit};
pub use crate::core::{Controller, ControllerBuilder, ShutdownSignals, wait_for_shutdown_signal};
pub use error::{ControllerError, JobError, OrderError};
pub use jobs::{Job, JobFn};
pub use logging::{Level, Logger, LoggerRef, NoopLogger, TracingLogger};
pub use order_restorer::OrderRestorer;

// Optional: expose a simple built-in stdout logger (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use logging::LogWriter;
