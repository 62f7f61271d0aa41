//! Batch import of state documents into a resource store.
//!
//! An import never fails because of a single item. Instances that cannot be
//! converted are skipped, writes that fail are recorded, and the caller gets
//! an [`ImportReport`] describing what happened to every instance. Only a
//! document that cannot be decoded at all fails the call.

use super::normalizer::{ConversionError, ResourceNormalizer};
use super::state::{ParseError, StateParser, TerraformState};
use crate::context::{ContextError, OperationContext};
use crate::ledger::{LedgerError, ProvenanceLedger};
use crate::models::{ChangeOperation, ChangeRecord, Resource};
use crate::store::{ResourceStore, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Actor recorded on change records produced by imports.
pub const DEFAULT_IMPORT_ACTOR: &str = "terraform-import";

/// Errors that fail an entire import.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The state document could not be decoded.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A converted resource that could not be written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to persist resource {resource_id}: {source}")]
pub struct PersistenceError {
    pub resource_id: String,
    #[source]
    pub source: StoreError,
}

/// Outcome of one import call.
#[derive(Debug, Clone)]
pub struct ImportReport {
    /// Identifier of this import, also recorded on its tracing span.
    pub import_id: Uuid,
    /// Serial of the imported state snapshot, when present.
    pub serial: Option<u64>,
    /// Lineage of the imported state, when present.
    pub lineage: Option<String>,
    /// Number of instances in the document.
    pub total_instances: usize,
    /// Every successfully converted resource, whether or not it was stored.
    pub resources: Vec<Resource>,
    /// Instances that could not be converted.
    pub skipped: Vec<ConversionError>,
    /// Number of resources written successfully.
    pub persisted: usize,
    /// Resources whose write failed.
    pub persistence_failures: Vec<PersistenceError>,
    /// Fingerprinted change records for stored resources.
    pub change_records: Vec<ChangeRecord>,
    /// Number of change records the ledger rejected.
    pub ledger_failures: usize,
    /// Set when the context stopped the import before the last instance.
    pub interrupted: Option<ContextError>,
    /// When the import started.
    pub started_at: DateTime<Utc>,
    /// When the import finished.
    pub completed_at: DateTime<Utc>,
}

impl ImportReport {
    fn new(import_id: Uuid, state: &TerraformState) -> Self {
        let now = Utc::now();
        Self {
            import_id,
            serial: state.serial,
            lineage: state.lineage.clone(),
            total_instances: state.instance_count(),
            resources: Vec::new(),
            skipped: Vec::new(),
            persisted: 0,
            persistence_failures: Vec::new(),
            change_records: Vec::new(),
            ledger_failures: 0,
            interrupted: None,
            started_at: now,
            completed_at: now,
        }
    }

    /// Number of instances converted into resources.
    pub fn imported(&self) -> usize {
        self.resources.len()
    }

    /// Returns true if every instance was converted and stored.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
            && self.persistence_failures.is_empty()
            && self.ledger_failures == 0
            && self.interrupted.is_none()
    }

    /// Returns a serializable summary of the report.
    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            import_id: self.import_id,
            serial: self.serial,
            lineage: self.lineage.clone(),
            total_instances: self.total_instances,
            imported: self.imported(),
            skipped: self.skipped.len(),
            persisted: self.persisted,
            persistence_failed: self.persistence_failures.len(),
            changes_tracked: self.change_records.len(),
            ledger_failures: self.ledger_failures,
            interrupted: self.interrupted,
            errors: self
                .skipped
                .iter()
                .map(ToString::to_string)
                .chain(self.persistence_failures.iter().map(ToString::to_string))
                .collect(),
            duration_ms: (self.completed_at - self.started_at)
                .num_milliseconds()
                .max(0) as u64,
            completed_at: self.completed_at,
        }
    }
}

/// Counts and messages from an [`ImportReport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub import_id: Uuid,
    pub serial: Option<u64>,
    pub lineage: Option<String>,
    pub total_instances: usize,
    pub imported: usize,
    pub skipped: usize,
    pub persisted: usize,
    pub persistence_failed: usize,
    pub changes_tracked: usize,
    pub ledger_failures: usize,
    pub interrupted: Option<ContextError>,
    /// Human-readable description of every skipped or failed item.
    pub errors: Vec<String>,
    pub duration_ms: u64,
    pub completed_at: DateTime<Utc>,
}

/// Imports state documents into a [`ResourceStore`].
pub struct StateImporter {
    store: Arc<dyn ResourceStore>,
    ledger: Option<Arc<dyn ProvenanceLedger>>,
    actor: String,
}

impl StateImporter {
    /// Creates an importer writing to the given store.
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self {
            store,
            ledger: None,
            actor: DEFAULT_IMPORT_ACTOR.to_string(),
        }
    }

    /// Records a `create` change for every stored resource.
    ///
    /// Disabled ledgers are ignored.
    pub fn with_ledger(mut self, ledger: Arc<dyn ProvenanceLedger>) -> Self {
        self.ledger = Some(ledger).filter(|l| l.is_enabled());
        self
    }

    /// Sets the actor recorded on change records.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    /// Parses a raw state document and imports every instance in it.
    pub async fn import_state(
        &self,
        ctx: &OperationContext,
        raw: &[u8],
    ) -> Result<ImportReport, ImportError> {
        let state = StateParser::parse(raw).map_err(|e| {
            error!(error = %e, "Failed to parse state document");
            e
        })?;
        Ok(self.import_parsed(ctx, &state).await)
    }

    /// Imports every instance of an already-parsed state document.
    #[instrument(skip_all, fields(import_id = tracing::field::Empty))]
    pub async fn import_parsed(
        &self,
        ctx: &OperationContext,
        state: &TerraformState,
    ) -> ImportReport {
        let import_id = Uuid::new_v4();
        tracing::Span::current().record("import_id", tracing::field::display(import_id));
        let started = Instant::now();

        let mut report = ImportReport::new(import_id, state);
        debug!(
            version = ?state.version,
            terraform_version = ?state.terraform_version,
            serial = ?state.serial,
            blocks = state.resources.len(),
            instances = report.total_instances,
            "Importing state document"
        );
        metrics::counter!("inv_import_instances_total").increment(report.total_instances as u64);

        for (block, instance) in state.instances() {
            if let Err(e) = ctx.check() {
                report.interrupted = Some(e);
                break;
            }

            let resource = match ResourceNormalizer::normalize(block, instance) {
                Ok(resource) => resource,
                Err(e) => {
                    warn!(block = %e.block(), error = %e, "Skipping instance");
                    metrics::counter!("inv_import_skipped_total").increment(1);
                    report.skipped.push(e);
                    continue;
                }
            };

            if let Err(e) = ctx.check() {
                report.interrupted = Some(e);
                break;
            }

            let stored = self.persist(ctx, &resource, &mut report).await;
            if stored {
                self.track_creation(ctx, &resource, &mut report).await;
            }
            report.resources.push(resource);

            if report.interrupted.is_some() {
                break;
            }
        }

        report.completed_at = Utc::now();
        metrics::histogram!("inv_import_duration_seconds").record(started.elapsed().as_secs_f64());

        if let Some(reason) = report.interrupted {
            warn!(
                reason = %reason,
                imported = report.imported(),
                total = report.total_instances,
                "Import interrupted"
            );
        }
        info!(
            total = report.total_instances,
            imported = report.imported(),
            skipped = report.skipped.len(),
            persisted = report.persisted,
            persistence_failed = report.persistence_failures.len(),
            changes_tracked = report.change_records.len(),
            "Import completed"
        );

        report
    }

    /// Writes one resource; returns true if it was stored.
    async fn persist(
        &self,
        ctx: &OperationContext,
        resource: &Resource,
        report: &mut ImportReport,
    ) -> bool {
        match self.store.create_resource(ctx, resource).await {
            Ok(()) => {
                report.persisted += 1;
                true
            }
            Err(e) => {
                error!(
                    resource_id = %resource.id,
                    resource_type = %resource.resource_type,
                    error = %e,
                    "Failed to persist resource"
                );
                metrics::counter!("inv_import_persist_failures_total").increment(1);
                if let StoreError::Interrupted(reason) = &e {
                    report.interrupted = Some(*reason);
                }
                report.persistence_failures.push(PersistenceError {
                    resource_id: resource.id.clone(),
                    source: e,
                });
                false
            }
        }
    }

    async fn track_creation(
        &self,
        ctx: &OperationContext,
        resource: &Resource,
        report: &mut ImportReport,
    ) {
        let Some(ledger) = &self.ledger else {
            return;
        };

        let mut record = ChangeRecord::new(
            resource.id.clone(),
            ChangeOperation::Create,
            self.actor.clone(),
            json!({
                "source": "terraform_state",
                "type": resource.resource_type,
                "provider": resource.provider,
                "name": resource.name,
            }),
        );

        match ledger.track_change(ctx, &mut record).await {
            Ok(()) => report.change_records.push(record),
            Err(e) => {
                warn!(resource_id = %resource.id, error = %e, "Failed to track change");
                report.ledger_failures += 1;
                if let LedgerError::Interrupted(reason) = e {
                    report.interrupted = Some(reason);
                }
            }
        }
    }
}
