//! Cancellation and deadline propagation.
//!
//! An [`OperationContext`] travels with every import, storage and ledger call
//! so long batches can stop between items when the caller shuts down or runs
//! out of time. Cancellation is a `watch` channel carrying a shutdown flag.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

/// Why an operation stopped early.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextError {
    /// The caller signalled cancellation.
    #[error("Operation cancelled")]
    Cancelled,
    /// The deadline passed.
    #[error("Deadline exceeded")]
    DeadlineExceeded,
}

/// Carries the cancellation signal and optional deadline for one operation.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    shutdown_rx: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl OperationContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Creates a context paired with a handle that cancels it.
    pub fn cancellable() -> (CancelHandle, Self) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        (
            CancelHandle { shutdown_tx },
            Self {
                shutdown_rx: Some(shutdown_rx),
                deadline: None,
            },
        )
    }

    /// Uses an existing shutdown channel as the cancellation signal.
    pub fn with_shutdown(mut self, shutdown_rx: watch::Receiver<bool>) -> Self {
        self.shutdown_rx = Some(shutdown_rx);
        self
    }

    /// Sets an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets a deadline relative to now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Returns the deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns an error if the operation should stop.
    pub fn check(&self) -> Result<(), ContextError> {
        if let Some(rx) = &self.shutdown_rx {
            if *rx.borrow() {
                return Err(ContextError::Cancelled);
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(ContextError::DeadlineExceeded);
            }
        }
        Ok(())
    }

    /// Returns true if the operation should stop.
    pub fn is_done(&self) -> bool {
        self.check().is_err()
    }
}

/// Cancels the contexts created alongside it.
#[derive(Debug)]
pub struct CancelHandle {
    shutdown_tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signals cancellation to every context sharing this handle's channel.
    pub fn cancel(&self) {
        // send_replace never fails, even with no receivers left.
        self.shutdown_tx.send_replace(true);
    }

    /// Returns a new receiver for building further contexts.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }
}
