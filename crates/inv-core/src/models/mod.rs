//! Data models for the resource inventory.
//!
//! This module provides the canonical resource record produced by the import
//! pipeline and the change events fingerprinted by the provenance ledger.

pub mod change;
pub mod resource;

pub use change::{ChangeOperation, ChangeRecord};
pub use resource::{CloudProvider, Resource, ResourceKey, ResourceState};
