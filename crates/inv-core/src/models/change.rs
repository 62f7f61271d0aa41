//! Change events handed to the provenance ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An attempted mutation of an inventory resource.
///
/// The first five fields describe the event and are covered by the content
/// fingerprint. `block_hash` and `transaction_id` are assigned by the ledger
/// and stay `None` until a ledger that is enabled has seen the record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeRecord {
    /// Resource the change applies to.
    pub resource_id: String,
    /// Kind of mutation.
    pub operation: ChangeOperation,
    /// User or system component that made the change.
    pub actor: String,
    /// When the change happened.
    pub timestamp: DateTime<Utc>,
    /// Structured diff describing the change.
    #[serde(default)]
    pub changes: serde_json::Value,
    /// Content fingerprint (lowercase hex SHA-256).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    /// Per-call transaction identifier (lowercase hex SHA-256).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Fingerprint of the previous change to the same resource, set only
    /// when the ledger runs with hash chaining.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_hash: Option<String>,
}

impl ChangeRecord {
    /// Creates a new change record stamped with the current time.
    pub fn new(
        resource_id: impl Into<String>,
        operation: ChangeOperation,
        actor: impl Into<String>,
        changes: serde_json::Value,
    ) -> Self {
        Self {
            resource_id: resource_id.into(),
            operation,
            actor: actor.into(),
            timestamp: Utc::now(),
            changes,
            block_hash: None,
            transaction_id: None,
            previous_hash: None,
        }
    }

    /// Overrides the event timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns true once a ledger has fingerprinted this record.
    pub fn is_fingerprinted(&self) -> bool {
        self.block_hash.is_some()
    }
}

/// Kind of mutation recorded in a change event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOperation {
    Create,
    Update,
    Delete,
}

impl ChangeOperation {
    /// Returns the wire name of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeOperation::Create => "create",
            ChangeOperation::Update => "update",
            ChangeOperation::Delete => "delete",
        }
    }
}

impl std::fmt::Display for ChangeOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
