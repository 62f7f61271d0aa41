//! Canonical resource model for the inventory.
//!
//! Resources are the provider-neutral view of an infrastructure object
//! (instance, bucket, network, ...) regardless of which IaC tool or cloud
//! it was discovered through.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A canonical inventory entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    /// Provider-assigned identifier, unique within (provider, type).
    pub id: String,
    /// Canonical dotted taxonomy type (e.g. `ec2.instance`).
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Cloud provider the resource belongs to.
    pub provider: CloudProvider,
    /// Human-readable name.
    pub name: String,
    /// Region the resource lives in, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Amazon Resource Name, when the source exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    /// String-valued tags.
    #[serde(default)]
    pub tags: HashMap<String, String>,
    /// Source-specific context kept for traceability.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Lifecycle state.
    pub state: ResourceState,
    /// Parent resource, for hierarchies built outside the import pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Child resources, for hierarchies built outside the import pipeline.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    /// When the resource was first seen.
    pub discovered_at: DateTime<Utc>,
    /// When the resource record was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    /// Creates a new active resource with the required fields.
    pub fn new(
        id: impl Into<String>,
        resource_type: impl Into<String>,
        provider: CloudProvider,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            provider,
            name: name.into(),
            region: None,
            arn: None,
            tags: HashMap::new(),
            metadata: HashMap::new(),
            state: ResourceState::Active,
            parent_id: None,
            children: Vec::new(),
            discovered_at: now,
            updated_at: now,
        }
    }

    /// Returns the key the resource is unique under.
    pub fn key(&self) -> ResourceKey {
        ResourceKey {
            provider: self.provider,
            resource_type: self.resource_type.clone(),
            id: self.id.clone(),
        }
    }

    /// Returns the tag value for the given key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Uniqueness key of a resource: the ID is only unique within a provider and type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub provider: CloudProvider,
    pub resource_type: String,
    pub id: String,
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.provider, self.resource_type, self.id)
    }
}

/// Cloud provider a resource belongs to.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    /// Amazon Web Services.
    Aws,
    /// Microsoft Azure.
    Azure,
    /// Google Cloud Platform.
    Gcp,
    /// Managed by Terraform through some other provider.
    Terraform,
    /// Provider could not be determined.
    #[default]
    Unknown,
}

impl CloudProvider {
    /// Returns the canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "aws",
            CloudProvider::Azure => "azure",
            CloudProvider::Gcp => "gcp",
            CloudProvider::Terraform => "terraform",
            CloudProvider::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a resource.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceState {
    /// Resource exists and is in use.
    Active,
    /// Resource exists but is stopped or disabled.
    Inactive,
    /// Resource is being provisioned.
    Pending,
    /// Resource was removed.
    Deleted,
    /// State could not be determined.
    #[default]
    Unknown,
}

impl std::fmt::Display for ResourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceState::Active => write!(f, "active"),
            ResourceState::Inactive => write!(f, "inactive"),
            ResourceState::Pending => write!(f, "pending"),
            ResourceState::Deleted => write!(f, "deleted"),
            ResourceState::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_creation() {
        let resource = Resource::new("i-123", "ec2.instance", CloudProvider::Aws, "web");

        assert_eq!(resource.id, "i-123");
        assert_eq!(resource.state, ResourceState::Active);
        assert!(resource.region.is_none());
        assert!(resource.tags.is_empty());
        assert!(resource.children.is_empty());
    }

    #[test]
    fn test_resource_key_display() {
        let resource = Resource::new("bucket-a", "s3.bucket", CloudProvider::Aws, "bucket-a");
        assert_eq!(resource.key().to_string(), "aws/s3.bucket/bucket-a");
    }

    #[test]
    fn test_provider_serialization() {
        let json = serde_json::to_string(&CloudProvider::Gcp).unwrap();
        assert_eq!(json, "\"gcp\"");

        let parsed: CloudProvider = serde_json::from_str("\"azure\"").unwrap();
        assert_eq!(parsed, CloudProvider::Azure);
        assert_eq!(CloudProvider::default(), CloudProvider::Unknown);
    }

    #[test]
    fn test_resource_serialization_skips_unset_fields() {
        let resource = Resource::new("i-1", "ec2.instance", CloudProvider::Aws, "web");
        let value = serde_json::to_value(&resource).unwrap();

        assert_eq!(value["type"], "ec2.instance");
        assert_eq!(value["state"], "active");
        assert!(value.get("region").is_none());
        assert!(value.get("arn").is_none());
        assert!(value.get("parent_id").is_none());
    }
}
