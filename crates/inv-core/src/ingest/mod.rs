//! IaC state ingestion pipeline.
//!
//! Converts Terraform state documents into canonical [`Resource`] records:
//!
//! 1. [`StateParser`] decodes the raw document.
//! 2. [`ResourceNormalizer`] converts each instance, using [`TypeMapper`] for
//!    the canonical type and [`resolve_provider`] for the provider.
//! 3. [`StateImporter`] drives the batch, persists each resource on its own
//!    and optionally records a fingerprinted change per stored resource.
//!
//! [`Resource`]: crate::models::Resource

pub mod attributes;
pub mod importer;
pub mod normalizer;
pub mod provider;
pub mod state;
pub mod type_map;

pub use attributes::{AttributeError, AttributeMap};
pub use importer::{
    ImportError, ImportReport, ImportSummary, PersistenceError, StateImporter,
    DEFAULT_IMPORT_ACTOR,
};
pub use normalizer::{infer_region, ConversionError, ResourceNormalizer};
pub use provider::resolve_provider;
pub use state::{ParseError, ResourceBlock, ResourceInstance, StateParser, TerraformState};
pub use type_map::TypeMapper;
