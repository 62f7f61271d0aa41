//! # inv-core
//!
//! Ingestion and provenance core for the cloud resource inventory.
//!
//! This crate turns IaC state documents into canonical resource records,
//! hands them to a storage collaborator one at a time, and fingerprints
//! resource change events for auditability.

pub mod context;
pub mod ingest;
pub mod ledger;
pub mod models;
pub mod store;

pub use context::{CancelHandle, ContextError, OperationContext};
pub use ingest::{
    resolve_provider, ImportError, ImportReport, ImportSummary, StateImporter, StateParser,
    TerraformState, TypeMapper,
};
pub use ledger::{
    build_ledger, ChainedLedger, ContentHashLedger, DisabledLedger, LedgerConfig, LedgerError,
    LedgerMode, ProvenanceLedger,
};
pub use models::{ChangeOperation, ChangeRecord, CloudProvider, Resource, ResourceState};
pub use store::{InMemoryResourceStore, ResourceStore, StoreError};
