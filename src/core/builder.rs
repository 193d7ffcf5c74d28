use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;

use crate::{
    config::ControllerConfig,
    core::controller::{Controller, Shared},
    core::{accounting, collector, shutdown},
    error::ControllerError,
    logging::{LoggerRef, NoopLogger},
    order_restorer::OrderRestorer,
};

/// Builder for constructing a [`Controller`] with optional features.
pub struct ControllerBuilder {
    cfg: ControllerConfig,
    log: LoggerRef,
}

impl ControllerBuilder {
    /// Creates a new builder with the given configuration and a [`NoopLogger`].
    pub fn new(cfg: ControllerConfig) -> Self {
        Self {
            cfg,
            log: Arc::new(NoopLogger),
        }
    }

    /// Sets the diagnostics sink for this controller.
    pub fn with_logger(mut self, log: LoggerRef) -> Self {
        self.log = log;
        self
    }

    /// Builds the controller and starts its background loops.
    ///
    /// This consumes the builder and spawns:
    /// - the accounting loop (owns the job counters)
    /// - the error-collection loop (fires the finish signal)
    /// - the OS signal listener, if `handle_signals` is set
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// Returns [`ControllerError::InvalidLimit`] if `limit < 1`; nothing is
    /// spawned in that case.
    pub fn build(self) -> Result<Controller, ControllerError> {
        let Self { cfg, log } = self;
        if cfg.limit < 1 {
            return Err(ControllerError::InvalidLimit { limit: cfg.limit });
        }

        let (tally_tx, tally_rx) = mpsc::unbounded_channel();
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let finish = CancellationToken::new();
        let drained = CancellationToken::new();
        let collected = Arc::new(Mutex::new(Vec::new()));

        tokio::spawn(accounting::run(
            tally_rx,
            shutdown.clone(),
            drained.clone(),
            log.clone(),
        ));
        tokio::spawn(collector::run(
            errors_rx,
            drained,
            finish.clone(),
            collected.clone(),
            log.clone(),
        ));
        if cfg.handle_signals {
            shutdown::spawn_listener(shutdown.clone(), finish.clone(), log.clone());
        }

        log.debug(format_args!(
            "controller started: limit={} fail_fast={}",
            cfg.limit, cfg.fail_fast
        ));

        let shared = Shared {
            tally: tally_tx,
            errors: errors_tx,
            limiter: Arc::new(Semaphore::new(cfg.limit)),
            order: Mutex::new(OrderRestorer::new(shutdown.clone())),
            shutdown,
            finish,
            collected,
            fail_fast: AtomicBool::new(cfg.fail_fast),
            waited: AtomicBool::new(false),
            log,
        };
        Ok(Controller::from_shared(Arc::new(shared)))
    }
}
