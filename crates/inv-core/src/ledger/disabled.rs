use super::{LedgerResult, ProvenanceLedger};
use crate::context::OperationContext;
use crate::models::ChangeRecord;
use async_trait::async_trait;

/// Ledger used when provenance tracking is switched off.
///
/// Leaves records untouched and accepts every record as valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledLedger;

#[async_trait]
impl ProvenanceLedger for DisabledLedger {
    async fn track_change(
        &self,
        _ctx: &OperationContext,
        _record: &mut ChangeRecord,
    ) -> LedgerResult<()> {
        Ok(())
    }

    fn verify_change_record(&self, _record: &ChangeRecord) -> bool {
        true
    }

    async fn get_change_history(
        &self,
        _ctx: &OperationContext,
        _resource_id: &str,
    ) -> LedgerResult<Vec<ChangeRecord>> {
        Ok(Vec::new())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
