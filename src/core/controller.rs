//! # Controller: counted job pools, cooperative shutdown, error aggregation.
//!
//! A [`Controller`] launches jobs into one of three pools and reports when
//! all of them are done.
//!
//! ```text
//! go / run_blocking ─────────► main pool ──────┐
//! limited_go / blocking_… ──► [semaphore] ──► limited pool ──┼─► Tally ─► accounting loop
//! background ────────────────► background pool ┘                 │
//!                                                                ├─► shutdown (main+limited == 0)
//! job Err(..) ─► error channel ─► collector ◄── drained ─────────┘
//!                                     └─► finish ─► wait() returns
//! ```
//!
//! ## Rules
//! - A launch is counted before the job body starts; a completion is
//!   counted after its error (if any) has been handed to the collector.
//! - Shutdown is advisory. Jobs watch [`Controller::is_shutting_down`] or
//!   await [`Controller::shutting_down`] and return.
//! - A limited job holds its semaphore slot only while its body runs; the
//!   slot is released before the job's error is recorded.
//! - Background failures always shut down; main and limited failures do
//!   so only in fail-fast mode.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::{
    config::ControllerConfig,
    core::accounting::{Pool, Tally},
    core::builder::ControllerBuilder,
    core::runner::run_job,
    error::{ControllerError, JobError},
    jobs::Job,
    logging::LoggerRef,
    order_restorer::OrderRestorer,
};

/// State shared by every handle of one controller.
pub(crate) struct Shared {
    pub(crate) tally: mpsc::UnboundedSender<Tally>,
    pub(crate) errors: mpsc::UnboundedSender<String>,
    pub(crate) limiter: Arc<Semaphore>,
    pub(crate) shutdown: CancellationToken,
    pub(crate) finish: CancellationToken,
    pub(crate) collected: Arc<Mutex<Vec<String>>>,
    pub(crate) fail_fast: AtomicBool,
    pub(crate) waited: AtomicBool,
    pub(crate) order: Mutex<OrderRestorer>,
    pub(crate) log: LoggerRef,
}

/// Supervises a dynamic set of jobs.
///
/// Cheap to clone: every clone is a handle to the same controller, and a
/// clone is what each job receives.
///
/// # Example
/// ```rust
/// use jobvisor::{Controller, ControllerError, JobError, JobFn};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let ctl = Controller::new(2).expect("limit is positive");
///
///     for i in 0..4 {
///         ctl.limited_go(JobFn::new(move |_ctl| async move {
///             if i == 3 {
///                 return Err(JobError::fail(format!("job {i} failed")));
///             }
///             Ok(())
///         }));
///     }
///
///     assert_eq!(ctl.wait().await, Err(ControllerError::JobsFailed));
///     assert_eq!(ctl.errors(), "job 3 failed");
/// }
/// ```
#[derive(Clone)]
pub struct Controller {
    inner: Arc<Shared>,
}

impl Controller {
    /// Returns a builder for a controller with the given configuration.
    pub fn builder(cfg: ControllerConfig) -> ControllerBuilder {
        ControllerBuilder::new(cfg)
    }

    /// Builds a controller with the given concurrency limit and default settings.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// Returns [`ControllerError::InvalidLimit`] if `limit < 1`.
    pub fn new(limit: usize) -> Result<Self, ControllerError> {
        ControllerBuilder::new(ControllerConfig::with_limit(limit)).build()
    }

    /// Builds a controller from [`ControllerConfig::default`].
    ///
    /// # Errors
    /// Returns [`ControllerError::InvalidLimit`] if the process-wide default
    /// limit was set below 1.
    pub fn with_defaults() -> Result<Self, ControllerError> {
        ControllerBuilder::new(ControllerConfig::default()).build()
    }

    pub(crate) fn from_shared(inner: Arc<Shared>) -> Self {
        Self { inner }
    }

    // ---------------------------
    // Launching
    // ---------------------------

    /// Runs `job` in the main pool, without a concurrency cap.
    ///
    /// Does nothing if the controller is already shutting down.
    pub fn go<J: Job>(&self, job: J) {
        if self.refuse(Pool::Main) {
            return;
        }
        self.tally(Tally::Launched(Pool::Main));

        let ctl = self.clone();
        tokio::spawn(async move {
            let res = run_job(job, ctl.clone()).await;
            ctl.complete(Pool::Main, res);
        });
    }

    /// Runs `job` in the main pool on the caller's task.
    ///
    /// Same counting and error routing as [`go`](Self::go), but the body is
    /// awaited here instead of being spawned.
    pub async fn run_blocking<J: Job>(&self, job: J) {
        if self.refuse(Pool::Main) {
            return;
        }
        self.tally(Tally::Launched(Pool::Main));

        let res = run_job(job, self.clone()).await;
        self.complete(Pool::Main, res);
    }

    /// Runs `job` in the limited pool once a semaphore slot is free.
    ///
    /// The job is counted immediately, so [`wait`](Self::wait) also waits
    /// for jobs still queued for a slot. A job still queued when shutdown
    /// fires is skipped. A job that finds a slot free runs even if shutdown
    /// was already requested, so its body should check for shutdown itself.
    pub fn limited_go<J: Job>(&self, job: J) {
        self.tally(Tally::Launched(Pool::Limited));

        let ctl = self.clone();
        tokio::spawn(async move {
            match ctl.acquire_slot().await {
                Some(permit) => ctl.run_limited(job, permit).await,
                None => ctl.skip_limited(),
            }
        });
    }

    /// Like [`limited_go`](Self::limited_go), but the caller waits for the
    /// slot (or shutdown) before this returns. The body still runs on its own task.
    pub async fn blocking_limited_go<J: Job>(&self, job: J) {
        self.tally(Tally::Launched(Pool::Limited));

        match self.acquire_slot().await {
            Some(permit) => {
                let ctl = self.clone();
                tokio::spawn(async move { ctl.run_limited(job, permit).await });
            }
            None => self.skip_limited(),
        }
    }

    /// Runs a supervisory `job` in the background pool.
    ///
    /// Background jobs do not keep the controller from shutting down; they
    /// are expected to exit once shutdown fires. Any failure is recorded and
    /// shuts the controller down.
    pub fn background<J: Job>(&self, job: J) {
        if self.refuse(Pool::Background) {
            return;
        }
        self.tally(Tally::Launched(Pool::Background));

        let ctl = self.clone();
        tokio::spawn(async move {
            let res = run_job(job, ctl.clone()).await;
            ctl.complete(Pool::Background, res);
        });
    }

    // ---------------------------
    // Lifecycle
    // ---------------------------

    /// Makes the first main or limited job failure shut the controller down.
    pub fn enable_fail_fast(&self) {
        self.inner.fail_fast.store(true, Ordering::Release);
    }

    /// Requests a graceful shutdown. Idempotent.
    pub fn shutdown(&self) {
        if !self.inner.shutdown.is_cancelled() {
            self.inner.log.info(format_args!("shutdown requested"));
            self.inner.shutdown.cancel();
        }
    }

    /// Returns `true` once shutdown was requested.
    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// Completes when shutdown is requested.
    pub fn shutting_down(&self) -> WaitForCancellationFuture<'_> {
        self.inner.shutdown.cancelled()
    }

    /// Returns a token cancelled when shutdown is requested.
    ///
    /// Cancelling the returned token does not shut the controller down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.inner.shutdown.child_token()
    }

    /// Declares the controller finished without waiting for jobs.
    ///
    /// Also requests shutdown. Jobs still running are abandoned: their
    /// completions are no longer waited for. Errors collected so far are
    /// still reported by [`wait`](Self::wait).
    pub fn finish(&self) {
        self.shutdown();
        if !self.inner.finish.is_cancelled() {
            self.inner.log.info(format_args!("finish requested"));
            self.inner.finish.cancel();
        }
    }

    /// Returns `true` once the controller finished.
    pub fn is_finished(&self) -> bool {
        self.inner.finish.is_cancelled()
    }

    /// Waits until every launched job has completed and its error is collected.
    ///
    /// Only the first call releases the waiter bias; later calls just wait
    /// for the same finish signal.
    ///
    /// # Errors
    /// Returns [`ControllerError::JobsFailed`] if any job failed; see
    /// [`errors`](Self::errors).
    pub async fn wait(&self) -> Result<(), ControllerError> {
        if !self.inner.waited.swap(true, Ordering::AcqRel) {
            self.tally(Tally::Completed(Pool::Main));
            self.tally(Tally::Completed(Pool::Limited));
        }

        self.inner.finish.cancelled().await;

        if self.lock_collected().is_empty() {
            Ok(())
        } else {
            Err(ControllerError::JobsFailed)
        }
    }

    /// Returns the collected failure messages joined with `", "`, in
    /// completion order, or an empty string.
    ///
    /// Complete only after [`wait`](Self::wait) returned.
    pub fn errors(&self) -> String {
        self.lock_collected().join(", ")
    }

    /// Returns the collected failure messages in completion order.
    pub fn error_messages(&self) -> Vec<String> {
        self.lock_collected().clone()
    }

    /// Hands out the next node of the controller's order-restorer chain.
    ///
    /// Nodes are handed out in call order; each one becomes ready when the
    /// previous one is finished, or fails once shutdown fires.
    pub fn next_order_restorer(&self) -> OrderRestorer {
        let mut head = self
            .inner
            .order
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let successor = head.next();
        std::mem::replace(&mut *head, successor)
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    fn lock_collected(&self) -> MutexGuard<'_, Vec<String>> {
        self.inner
            .collected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn tally(&self, tally: Tally) {
        // The accounting loop is gone once the controller drained; late
        // movements no longer matter.
        let _ = self.inner.tally.send(tally);
    }

    fn refuse(&self, pool: Pool) -> bool {
        if self.is_shutting_down() {
            self.inner
                .log
                .debug(format_args!("not running {pool} job: shutting down"));
            return true;
        }
        false
    }

    /// Waits for a slot; a granted slot wins over a simultaneous shutdown.
    async fn acquire_slot(&self) -> Option<OwnedSemaphorePermit> {
        let acquire = self.inner.limiter.clone().acquire_owned();
        tokio::select! {
            biased;
            permit = acquire => permit.ok(),
            _ = self.inner.shutdown.cancelled() => None,
        }
    }

    async fn run_limited<J: Job>(&self, job: J, permit: OwnedSemaphorePermit) {
        let res = run_job(job, self.clone()).await;
        drop(permit);
        self.complete(Pool::Limited, res);
    }

    fn skip_limited(&self) {
        self.inner
            .log
            .debug(format_args!("limited job skipped: shutting down"));
        self.tally(Tally::Completed(Pool::Limited));
    }

    fn complete(&self, pool: Pool, res: Result<(), JobError>) {
        if let Err(err) = res {
            self.record(pool, err);
        }
        self.tally(Tally::Completed(pool));
    }

    fn record(&self, pool: Pool, err: JobError) {
        if err.is_shutdown() {
            return;
        }

        let msg = err.to_string();
        self.inner
            .log
            .debug(format_args!("{pool} job failed: {msg}"));
        if self.inner.errors.send(msg).is_err() {
            self.inner
                .log
                .warn(format_args!("{pool} job error dropped: collection closed"));
        }

        if pool == Pool::Background || self.inner.fail_fast.load(Ordering::Acquire) {
            self.shutdown();
        }
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("limit_available", &self.inner.limiter.available_permits())
            .field("fail_fast", &self.inner.fail_fast.load(Ordering::Relaxed))
            .field("shutting_down", &self.is_shutting_down())
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}
