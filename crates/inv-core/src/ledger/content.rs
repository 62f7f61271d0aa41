use super::fingerprint::{content_fingerprint, transaction_id};
use super::{LedgerResult, ProvenanceLedger};
use crate::context::OperationContext;
use crate::models::ChangeRecord;
use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

/// Ledger that fingerprints each change event on its own.
///
/// `block_hash` depends only on the record content. `transaction_id` mixes in
/// the wall-clock time of the call, so tracking the same content twice yields
/// the same hash under two different transaction IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHashLedger;

impl ContentHashLedger {
    /// Creates a new content-hashing ledger.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvenanceLedger for ContentHashLedger {
    async fn track_change(
        &self,
        ctx: &OperationContext,
        record: &mut ChangeRecord,
    ) -> LedgerResult<()> {
        ctx.check()?;

        let block_hash = content_fingerprint(record)?;
        let tx_id = transaction_id(&record.resource_id, Utc::now());
        debug!(
            resource_id = %record.resource_id,
            operation = %record.operation,
            block_hash = %block_hash,
            transaction_id = %tx_id,
            "Change record fingerprinted"
        );

        record.block_hash = Some(block_hash);
        record.transaction_id = Some(tx_id);
        Ok(())
    }

    fn verify_change_record(&self, record: &ChangeRecord) -> bool {
        let Some(stored) = record.block_hash.as_deref() else {
            return false;
        };
        match content_fingerprint(record) {
            Ok(expected) => expected == stored,
            Err(_) => false,
        }
    }

    async fn get_change_history(
        &self,
        ctx: &OperationContext,
        resource_id: &str,
    ) -> LedgerResult<Vec<ChangeRecord>> {
        ctx.check()?;
        debug!(resource_id = %resource_id, "No ledger store attached; history is empty");
        Ok(Vec::new())
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextError;
    use crate::ledger::LedgerError;
    use crate::models::ChangeOperation;
    use chrono::TimeZone;
    use serde_json::json;
    use std::time::Duration;

    fn record() -> ChangeRecord {
        ChangeRecord::new(
            "i-123",
            ChangeOperation::Update,
            "alice",
            json!({"tags": {"Env": {"from": "dev", "to": "prod"}}}),
        )
        .with_timestamp(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_track_assigns_hash_and_transaction() {
        let ledger = ContentHashLedger::new();
        let mut r = record();

        ledger
            .track_change(&OperationContext::background(), &mut r)
            .await
            .unwrap();

        assert_eq!(r.block_hash.as_deref().map(str::len), Some(64));
        assert_eq!(r.transaction_id.as_deref().map(str::len), Some(64));
        assert_ne!(r.block_hash, r.transaction_id);
    }

    #[tokio::test]
    async fn test_identical_content_same_hash_different_transaction() {
        let ledger = ContentHashLedger::new();
        let ctx = OperationContext::background();
        let mut a = record();
        let mut b = record();

        ledger.track_change(&ctx, &mut a).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        ledger.track_change(&ctx, &mut b).await.unwrap();

        assert_eq!(a.block_hash, b.block_hash);
        assert_ne!(a.transaction_id, b.transaction_id);
    }

    #[tokio::test]
    async fn test_verify_after_track() {
        let ledger = ContentHashLedger::new();
        let mut r = record();
        ledger
            .track_change(&OperationContext::background(), &mut r)
            .await
            .unwrap();

        assert!(ledger.verify_change_record(&r));
    }

    #[tokio::test]
    async fn test_verify_detects_tampering() {
        let ledger = ContentHashLedger::new();
        let mut tracked = record();
        ledger
            .track_change(&OperationContext::background(), &mut tracked)
            .await
            .unwrap();

        let mut r = tracked.clone();
        r.resource_id = "i-999".to_string();
        assert!(!ledger.verify_change_record(&r));

        let mut r = tracked.clone();
        r.operation = ChangeOperation::Delete;
        assert!(!ledger.verify_change_record(&r));

        let mut r = tracked.clone();
        r.actor = "mallory".to_string();
        assert!(!ledger.verify_change_record(&r));

        let mut r = tracked.clone();
        r.timestamp = r.timestamp + chrono::Duration::seconds(1);
        assert!(!ledger.verify_change_record(&r));

        let mut r = tracked.clone();
        r.changes = json!({});
        assert!(!ledger.verify_change_record(&r));

        let mut r = tracked;
        r.transaction_id = Some("replaced".to_string());
        assert!(ledger.verify_change_record(&r));
    }

    #[test]
    fn test_unfingerprinted_record_fails_verification() {
        assert!(!ContentHashLedger::new().verify_change_record(&record()));
    }

    #[tokio::test]
    async fn test_cancelled_context() {
        let ledger = ContentHashLedger::new();
        let (handle, ctx) = OperationContext::cancellable();
        handle.cancel();
        let mut r = record();

        let err = ledger.track_change(&ctx, &mut r).await.unwrap_err();
        assert_eq!(err, LedgerError::Interrupted(ContextError::Cancelled));
        assert!(r.block_hash.is_none());

        assert!(ledger.get_change_history(&ctx, "i-123").await.is_err());
    }

    #[tokio::test]
    async fn test_history_is_empty() {
        let ledger = ContentHashLedger::new();
        let history = ledger
            .get_change_history(&OperationContext::background(), "i-123")
            .await
            .unwrap();
        assert!(history.is_empty());
        assert!(ledger.is_enabled());
    }
}
