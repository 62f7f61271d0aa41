//! Failure-injecting store for testing partial batches.

use super::{InMemoryResourceStore, ResourceStore, StoreError, StoreResult};
use crate::context::OperationContext;
use crate::models::Resource;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

/// Store that rejects writes for selected resource IDs and delegates the rest
/// to an [`InMemoryResourceStore`].
#[derive(Debug, Default)]
pub struct FlakyResourceStore {
    inner: InMemoryResourceStore,
    failing_ids: HashSet<String>,
    attempts: AtomicU64,
}

impl FlakyResourceStore {
    /// Creates a store that fails writes for the given resource IDs.
    pub fn failing_on<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: InMemoryResourceStore::new(),
            failing_ids: ids.into_iter().map(Into::into).collect(),
            attempts: AtomicU64::new(0),
        }
    }

    /// Returns the store holding the successful writes.
    pub fn inner(&self) -> &InMemoryResourceStore {
        &self.inner
    }

    /// Returns how many writes were attempted.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceStore for FlakyResourceStore {
    async fn create_resource(
        &self,
        ctx: &OperationContext,
        resource: &Resource,
    ) -> StoreResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing_ids.contains(&resource.id) {
            return Err(StoreError::Internal(format!(
                "injected failure for {}",
                resource.id
            )));
        }
        self.inner.create_resource(ctx, resource).await
    }
}
