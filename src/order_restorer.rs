//! # Order restorer: a chain of one-shot barriers.
//!
//! Jobs launched concurrently (to do their slow, unordered work in
//! parallel) often still need one step to happen in launch order. Each job
//! takes one [`OrderRestorer`] from a chain, does its unordered work, then
//! brackets the ordered step with [`OrderRestorer::wait`] and
//! [`OrderRestorer::finished`].
//!
//! ```text
//!   node 1            node 2            node 3
//!  ┌────────┐        ┌────────┐        ┌────────┐
//!  │ prev ✓ │        │ prev ──┼──┐     │ prev ──┼──┐
//!  │ next ──┼────────┼► (=)   │  └─────┼► (=)   │  └─ ...
//!  └────────┘        │ next ──┼────────┘        │
//!                    └────────┘                 │
//!  done: shared shutdown token on every node ───┘
//! ```
//!
//! ## Rules
//! - The head's `prev` is already satisfied.
//! - `wait` returns `Ok` once the predecessor finished, or
//!   [`OrderError::ControllerFinished`] if `done` fired first.
//! - `finished` waits for the node's own turn before releasing the
//!   successor, and consumes the node, so a node cannot be finished twice.
//! - A node dropped without `finished` leaves its successor waiting until `done`.

use tokio_util::sync::CancellationToken;

use crate::error::OrderError;

/// One node of an order-restoring barrier chain.
#[derive(Debug)]
pub struct OrderRestorer {
    done: CancellationToken,
    prev: CancellationToken,
    next: CancellationToken,
}

impl OrderRestorer {
    /// Builds the head of a new chain.
    ///
    /// `done` is the bail-out signal shared by every node; the controller
    /// passes its shutdown token.
    pub fn new(done: CancellationToken) -> Self {
        let prev = CancellationToken::new();
        prev.cancel();
        Self {
            done,
            prev,
            next: CancellationToken::new(),
        }
    }

    /// Derives the node that comes right after this one.
    ///
    /// The successor becomes ready when this node is [`finished`](Self::finished).
    pub fn next(&self) -> Self {
        Self {
            done: self.done.clone(),
            prev: self.next.clone(),
            next: CancellationToken::new(),
        }
    }

    /// Waits for the predecessor to finish.
    ///
    /// Returns [`OrderError::ControllerFinished`] if `done` fires while still
    /// waiting. If both are already set, the predecessor wins.
    pub async fn wait(&self) -> Result<(), OrderError> {
        tokio::select! {
            biased;
            _ = self.prev.cancelled() => Ok(()),
            _ = self.done.cancelled() => Err(OrderError::ControllerFinished),
        }
    }

    /// Returns `true` if the predecessor has finished.
    pub fn is_ready(&self) -> bool {
        self.prev.is_cancelled()
    }

    /// Marks this node's ordered step as complete, releasing the successor.
    ///
    /// Waits for the predecessor first, so a node finished early never
    /// releases its successor ahead of its own turn. The successor is
    /// released either way.
    ///
    /// # Errors
    /// Returns [`OrderError::ControllerFinished`] if `done` fired before the
    /// predecessor finished.
    pub async fn finished(self) -> Result<(), OrderError> {
        let res = self.wait().await;
        self.next.cancel();
        res
    }
}
