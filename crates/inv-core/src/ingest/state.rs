//! Terraform state document decoding.
//!
//! Only the parts of the state v4 format the importer consumes are typed.
//! Unknown fields are ignored and missing optional fields default, so any
//! well-formed document decodes; structural type errors are fatal.

use super::attributes::AttributeMap;
use serde::Deserialize;
use thiserror::Error;

/// Error decoding a state document.
#[derive(Error, Debug)]
#[error("Failed to parse state document: {0}")]
pub struct ParseError(#[from] serde_json::Error);

impl ParseError {
    /// Line of the failure (1-based), when known.
    pub fn line(&self) -> usize {
        self.0.line()
    }

    /// Column of the failure (1-based), when known.
    pub fn column(&self) -> usize {
        self.0.column()
    }
}

/// A decoded state document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TerraformState {
    /// State format version.
    #[serde(default)]
    pub version: Option<u64>,
    /// Version of the tool that wrote the state.
    #[serde(default)]
    pub terraform_version: Option<String>,
    /// Monotonic serial of this state snapshot.
    #[serde(default)]
    pub serial: Option<u64>,
    /// Lineage identifier shared by all snapshots of one state.
    #[serde(default)]
    pub lineage: Option<String>,
    /// Resource blocks.
    #[serde(default)]
    pub resources: Vec<ResourceBlock>,
}

impl TerraformState {
    /// Total number of instances across all blocks.
    pub fn instance_count(&self) -> usize {
        self.resources.iter().map(|b| b.instances.len()).sum()
    }

    /// Iterates over every (block, instance) pair.
    pub fn instances(&self) -> impl Iterator<Item = (&ResourceBlock, &ResourceInstance)> {
        self.resources
            .iter()
            .flat_map(|block| block.instances.iter().map(move |inst| (block, inst)))
    }
}

/// A resource block: one `resource` declaration and its instances.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceBlock {
    /// Source type identifier (e.g. `aws_instance`).
    #[serde(rename = "type", default)]
    pub resource_type: String,
    /// Local name of the block.
    #[serde(default)]
    pub name: String,
    /// Module path, for blocks declared inside a module.
    #[serde(default)]
    pub module: Option<String>,
    /// Provider locator (e.g. `provider["registry.terraform.io/hashicorp/aws"]`).
    #[serde(default)]
    pub provider: String,
    /// Concrete instances.
    #[serde(default)]
    pub instances: Vec<ResourceInstance>,
}

impl ResourceBlock {
    /// Returns the `<type>.<name>` address of the block.
    pub fn address(&self) -> String {
        format!("{}.{}", self.resource_type, self.name)
    }
}

/// One concrete instance of a resource block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceInstance {
    /// Provider schema version the attributes conform to.
    #[serde(default)]
    pub schema_version: u64,
    /// Addresses this instance depends on.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Provider-specific attributes.
    #[serde(default)]
    pub attributes: AttributeMap,
}

/// Decodes raw state documents.
pub struct StateParser;

impl StateParser {
    /// Parses a state document from bytes.
    pub fn parse(bytes: &[u8]) -> Result<TerraformState, ParseError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Parses a state document from a string.
    pub fn parse_str(input: &str) -> Result<TerraformState, ParseError> {
        Self::parse(input.as_bytes())
    }
}
