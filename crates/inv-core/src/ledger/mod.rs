//! Provenance ledger for resource change events.
//!
//! A ledger stamps each [`ChangeRecord`] with a content fingerprint
//! (`block_hash`) and a per-call `transaction_id`, and can later verify that
//! a record still matches its fingerprint.
//!
//! The ledger mode is chosen once, when [`build_ledger`] runs:
//!
//! - [`DisabledLedger`]: every call is a no-op and verification always passes.
//! - [`ContentHashLedger`]: point-in-time fingerprints of single events.
//! - [`ChainedLedger`]: fingerprints that also cover the previous fingerprint
//!   recorded for the same resource.
//!
//! Change history lives in an external ledger store; the implementations here
//! return an empty history.

mod chain;
mod content;
mod disabled;
pub mod fingerprint;

pub use chain::ChainedLedger;
pub use content::ContentHashLedger;
pub use disabled::DisabledLedger;

use crate::context::{ContextError, OperationContext};
use crate::models::ChangeRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur in ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The operation context was cancelled or timed out.
    #[error("Interrupted: {0}")]
    Interrupted(#[from] ContextError),
    /// The record could not be rendered for hashing.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Fingerprinting and verification of change events.
#[async_trait]
pub trait ProvenanceLedger: Send + Sync {
    /// Fingerprints the record in place.
    async fn track_change(
        &self,
        ctx: &OperationContext,
        record: &mut ChangeRecord,
    ) -> LedgerResult<()>;

    /// Returns true if the record still matches its stored fingerprint.
    fn verify_change_record(&self, record: &ChangeRecord) -> bool;

    /// Returns the recorded changes for a resource.
    async fn get_change_history(
        &self,
        ctx: &OperationContext,
        resource_id: &str,
    ) -> LedgerResult<Vec<ChangeRecord>>;

    /// Returns true if the ledger fingerprints records.
    fn is_enabled(&self) -> bool;
}

/// Ledger settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Whether change records are fingerprinted at all.
    pub enabled: bool,
    /// Whether fingerprints are chained per resource.
    pub chained: bool,
}

impl LedgerConfig {
    /// Configuration for an enabled, unchained ledger.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            chained: false,
        }
    }

    /// Returns the mode this configuration selects.
    pub fn mode(&self) -> LedgerMode {
        match (self.enabled, self.chained) {
            (false, _) => LedgerMode::Disabled,
            (true, false) => LedgerMode::ContentHash,
            (true, true) => LedgerMode::Chained,
        }
    }
}

/// Which ledger implementation is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerMode {
    Disabled,
    ContentHash,
    Chained,
}

impl std::fmt::Display for LedgerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerMode::Disabled => write!(f, "disabled"),
            LedgerMode::ContentHash => write!(f, "content_hash"),
            LedgerMode::Chained => write!(f, "chained"),
        }
    }
}

/// Builds the ledger selected by the configuration.
pub fn build_ledger(config: &LedgerConfig) -> Arc<dyn ProvenanceLedger> {
    if !config.enabled && config.chained {
        warn!("Ledger chaining requested while the ledger is disabled; chaining ignored");
    }

    let mode = config.mode();
    info!(mode = %mode, "Provenance ledger initialized");

    match mode {
        LedgerMode::Disabled => Arc::new(DisabledLedger),
        LedgerMode::ContentHash => Arc::new(ContentHashLedger::new()),
        LedgerMode::Chained => Arc::new(ChainedLedger::new()),
    }
}
