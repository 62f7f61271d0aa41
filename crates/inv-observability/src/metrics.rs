//! Metric descriptions for the inventory pipeline.
//!
//! The pipeline records through the `metrics` facade; installing an exporter
//! is up to the host process. Registering descriptions is idempotent.

use ::metrics::{describe_counter, describe_histogram, Unit};

/// Instances seen across all imports.
pub const IMPORT_INSTANCES_TOTAL: &str = "inv_import_instances_total";
/// Instances skipped because they could not be converted.
pub const IMPORT_SKIPPED_TOTAL: &str = "inv_import_skipped_total";
/// Resources whose write to the store failed.
pub const IMPORT_PERSIST_FAILURES_TOTAL: &str = "inv_import_persist_failures_total";
/// Wall-clock duration of one import.
pub const IMPORT_DURATION_SECONDS: &str = "inv_import_duration_seconds";

/// Registers descriptions for every pipeline metric.
pub fn register_metrics() {
    describe_counter!(
        IMPORT_INSTANCES_TOTAL,
        "Total number of state instances processed"
    );
    describe_counter!(
        IMPORT_SKIPPED_TOTAL,
        "Total number of state instances skipped during normalization"
    );
    describe_counter!(
        IMPORT_PERSIST_FAILURES_TOTAL,
        "Total number of resources that failed to persist"
    );
    describe_histogram!(
        IMPORT_DURATION_SECONDS,
        Unit::Seconds,
        "Duration of a state import"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_without_recorder() {
        register_metrics();
        register_metrics();
    }

    #[test]
    fn test_metric_names_are_prefixed() {
        for name in [
            IMPORT_INSTANCES_TOTAL,
            IMPORT_SKIPPED_TOTAL,
            IMPORT_PERSIST_FAILURES_TOTAL,
            IMPORT_DURATION_SECONDS,
        ] {
            assert!(name.starts_with("inv_import_"));
        }
    }
}
