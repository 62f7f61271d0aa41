//! Resource persistence contract.
//!
//! The persistence engine itself lives outside this crate. Importers only
//! depend on the write contract in [`ResourceStore`]; each call commits or
//! fails on its own and callers never expect transactional grouping.

pub mod mock;

pub use mock::FlakyResourceStore;

use crate::context::{ContextError, OperationContext};
use crate::models::{CloudProvider, Resource, ResourceKey};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur in a resource store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A resource with the same key already exists.
    #[error("Duplicate: {0}")]
    Duplicate(String),
    /// The operation context was cancelled or timed out.
    #[error("Interrupted: {0}")]
    Interrupted(#[from] ContextError),
    /// Backend failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Write contract for canonical resources.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Persists a single resource.
    async fn create_resource(&self, ctx: &OperationContext, resource: &Resource)
        -> StoreResult<()>;
}

// ============================================================================
// In-Memory Implementation
// ============================================================================

/// In-memory resource store keyed by (provider, type, id).
///
/// Used by the CLI and by tests. Writers are serialized by the inner lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResourceStore {
    resources: Arc<RwLock<HashMap<ResourceKey, Resource>>>,
}

impl InMemoryResourceStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a resource by its unique key parts.
    pub async fn get(
        &self,
        provider: CloudProvider,
        resource_type: &str,
        id: &str,
    ) -> Option<Resource> {
        let key = ResourceKey {
            provider,
            resource_type: resource_type.to_string(),
            id: id.to_string(),
        };
        self.resources.read().await.get(&key).cloned()
    }

    /// Returns all stored resources ordered by key.
    pub async fn list(&self) -> Vec<Resource> {
        let resources = self.resources.read().await;
        let mut results: Vec<Resource> = resources.values().cloned().collect();
        results.sort_by(|a, b| a.key().cmp(&b.key()));
        results
    }

    /// Returns the number of stored resources.
    pub async fn count(&self) -> usize {
        self.resources.read().await.len()
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn create_resource(
        &self,
        ctx: &OperationContext,
        resource: &Resource,
    ) -> StoreResult<()> {
        ctx.check()?;

        let key = resource.key();
        let mut resources = self.resources.write().await;
        if resources.contains_key(&key) {
            return Err(StoreError::Duplicate(format!(
                "Resource {} already exists",
                key
            )));
        }
        resources.insert(key, resource.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str) -> Resource {
        Resource::new(id, "ec2.instance", CloudProvider::Aws, format!("web-{}", id))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryResourceStore::new();
        let ctx = OperationContext::background();

        store.create_resource(&ctx, &sample("i-1")).await.unwrap();

        let found = store
            .get(CloudProvider::Aws, "ec2.instance", "i-1")
            .await
            .unwrap();
        assert_eq!(found.name, "web-i-1");
        assert_eq!(store.count().await, 1);
        assert!(store
            .get(CloudProvider::Gcp, "ec2.instance", "i-1")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_rejected() {
        let store = InMemoryResourceStore::new();
        let ctx = OperationContext::background();

        store.create_resource(&ctx, &sample("i-1")).await.unwrap();
        let err = store.create_resource(&ctx, &sample("i-1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_same_id_different_type() {
        let store = InMemoryResourceStore::new();
        let ctx = OperationContext::background();

        store.create_resource(&ctx, &sample("shared")).await.unwrap();
        let other = Resource::new("shared", "s3.bucket", CloudProvider::Aws, "shared");
        store.create_resource(&ctx, &other).await.unwrap();

        let listed = store.list().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].resource_type, "ec2.instance");
        assert_eq!(listed[1].resource_type, "s3.bucket");
    }

    #[tokio::test]
    async fn test_cancelled_context_rejects_write() {
        let store = InMemoryResourceStore::new();
        let (handle, ctx) = OperationContext::cancellable();
        handle.cancel();

        let err = store.create_resource(&ctx, &sample("i-1")).await.unwrap_err();
        assert_eq!(err, StoreError::Interrupted(ContextError::Cancelled));
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_trait_object_shares_state() {
        let store = InMemoryResourceStore::new();
        let shared: Arc<dyn ResourceStore> = Arc::new(store.clone());
        let ctx = OperationContext::background();

        shared.create_resource(&ctx, &sample("i-1")).await.unwrap();
        assert_eq!(store.count().await, 1);
    }
}
