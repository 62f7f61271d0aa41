//! Conversion of state instances into canonical resources.

use super::attributes::{AttributeError, AttributeMap};
use super::provider::resolve_provider;
use super::state::{ResourceBlock, ResourceInstance};
use super::type_map::TypeMapper;
use crate::models::{Resource, ResourceState};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Metadata key for the source type identifier.
pub const META_SOURCE_TYPE: &str = "terraform_type";
/// Metadata key for the block name.
pub const META_SOURCE_NAME: &str = "terraform_name";
/// Metadata key for the module path.
pub const META_SOURCE_MODULE: &str = "terraform_module";
/// Metadata key for the provider schema version.
pub const META_SCHEMA_VERSION: &str = "schema_version";
/// Metadata key for the dependency list.
pub const META_DEPENDENCIES: &str = "dependencies";
/// Metadata key for the full raw attribute map.
pub const META_ATTRIBUTES: &str = "attributes";

/// An instance that could not be converted. The instance is skipped and
/// the rest of the batch continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The instance has no usable `id` attribute.
    #[error("{block}: instance has no id attribute")]
    MissingId { block: String },
    /// A required attribute has the wrong type.
    #[error("{block}: {source}")]
    InvalidField {
        block: String,
        #[source]
        source: AttributeError,
    },
}

impl ConversionError {
    /// Address of the block the failing instance belongs to.
    pub fn block(&self) -> &str {
        match self {
            ConversionError::MissingId { block } | ConversionError::InvalidField { block, .. } => {
                block
            }
        }
    }
}

/// Builds canonical [`Resource`] records from state instances.
pub struct ResourceNormalizer;

impl ResourceNormalizer {
    /// Converts one instance of a block into a resource.
    pub fn normalize(
        block: &ResourceBlock,
        instance: &ResourceInstance,
    ) -> Result<Resource, ConversionError> {
        let attrs = &instance.attributes;

        let id = match attrs.get_str("id") {
            Ok(Some(id)) if !id.is_empty() => id.to_string(),
            Ok(_) => {
                return Err(ConversionError::MissingId {
                    block: block.address(),
                })
            }
            Err(source) => {
                return Err(ConversionError::InvalidField {
                    block: block.address(),
                    source,
                })
            }
        };

        let name = optional_str(attrs, "name")
            .map(str::to_string)
            .unwrap_or_else(|| block.address());

        let mut resource = Resource::new(
            id,
            TypeMapper::map(&block.resource_type),
            resolve_provider(&block.provider),
            name,
        );
        resource.state = ResourceState::Active;
        resource.tags = attrs.get_string_map("tags");
        resource.region = infer_region(attrs);
        resource.arn = optional_str(attrs, "arn").map(str::to_string);
        resource.metadata = source_metadata(block, instance);

        Ok(resource)
    }
}

/// Infers the region of an instance.
///
/// An explicit `region` attribute wins. Otherwise an `availability_zone`
/// longer than two characters is trimmed of its trailing zone letter
/// (`us-east-1a` becomes `us-east-1`).
pub fn infer_region(attrs: &AttributeMap) -> Option<String> {
    if let Some(region) = optional_str(attrs, "region") {
        return Some(region.to_string());
    }

    let zone = optional_str(attrs, "availability_zone")?;
    let mut chars = zone.chars();
    if chars.clone().count() <= 2 {
        return None;
    }
    chars.next_back();
    Some(chars.as_str().to_string())
}

/// Reads an optional string attribute, treating a type mismatch as absent.
fn optional_str<'a>(attrs: &'a AttributeMap, key: &str) -> Option<&'a str> {
    match attrs.get_str(key) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, "Ignoring mistyped optional attribute");
            None
        }
    }
}

fn source_metadata(
    block: &ResourceBlock,
    instance: &ResourceInstance,
) -> HashMap<String, Value> {
    let mut metadata = HashMap::new();
    metadata.insert(
        META_SOURCE_TYPE.to_string(),
        Value::String(block.resource_type.clone()),
    );
    metadata.insert(
        META_SOURCE_NAME.to_string(),
        Value::String(block.name.clone()),
    );
    if let Some(module) = &block.module {
        metadata.insert(META_SOURCE_MODULE.to_string(), Value::String(module.clone()));
    }
    metadata.insert(
        META_SCHEMA_VERSION.to_string(),
        Value::from(instance.schema_version),
    );
    metadata.insert(
        META_DEPENDENCIES.to_string(),
        Value::from(instance.dependencies.clone()),
    );
    metadata.insert(META_ATTRIBUTES.to_string(), instance.attributes.to_value());
    metadata
}
