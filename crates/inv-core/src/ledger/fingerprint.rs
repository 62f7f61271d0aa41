//! Content fingerprints and transaction identifiers.
//!
//! A fingerprint is the SHA-256 of a canonical JSON rendering of the change
//! event: fixed field order, RFC 3339 timestamp with nanoseconds in UTC, and
//! object keys sorted at every depth. Identical events always produce the
//! same fingerprint.

use super::{LedgerError, LedgerResult};
use crate::models::ChangeRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Fingerprint input; field order here is the canonical order.
#[derive(Serialize)]
struct FingerprintInput<'a> {
    resource_id: &'a str,
    operation: &'a str,
    actor: &'a str,
    timestamp: String,
    changes: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_hash: Option<&'a str>,
}

/// Computes the content fingerprint of a change event.
///
/// Covers resource ID, operation, actor, timestamp and changes only.
pub fn content_fingerprint(record: &ChangeRecord) -> LedgerResult<String> {
    digest_record(record, None)
}

/// Computes a fingerprint that also covers the record's `previous_hash`.
pub fn chained_fingerprint(record: &ChangeRecord) -> LedgerResult<String> {
    digest_record(record, record.previous_hash.as_deref())
}

/// Derives a transaction identifier from the resource ID and a point in time.
///
/// Not reproducible from the record content: callers pass the current time.
pub fn transaction_id(resource_id: &str, at: DateTime<Utc>) -> String {
    let nanos = at
        .timestamp_nanos_opt()
        .unwrap_or_else(|| at.timestamp_micros().saturating_mul(1_000));
    sha256_hex(format!("{}:{}", resource_id, nanos).as_bytes())
}

fn digest_record(record: &ChangeRecord, previous_hash: Option<&str>) -> LedgerResult<String> {
    let input = FingerprintInput {
        resource_id: &record.resource_id,
        operation: record.operation.as_str(),
        actor: &record.actor,
        timestamp: record
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Nanos, true),
        changes: canonicalize(&record.changes),
        previous_hash,
    };
    let bytes =
        serde_json::to_vec(&input).map_err(|e| LedgerError::Serialization(e.to_string()))?;
    Ok(sha256_hex(&bytes))
}

/// Rebuilds a JSON value with object keys in sorted order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChangeOperation;
    use chrono::TimeZone;
    use serde_json::json;

    fn record() -> ChangeRecord {
        ChangeRecord::new(
            "i-123",
            ChangeOperation::Update,
            "alice",
            json!({"instance_type": {"from": "t3.micro", "to": "t3.large"}}),
        )
        .with_timestamp(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = content_fingerprint(&record()).unwrap();
        let b = content_fingerprint(&record()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_fingerprint_ignores_key_order() {
        let mut a = record();
        a.changes = serde_json::from_str(r#"{"b": 1, "a": {"y": 2, "x": 3}}"#).unwrap();
        let mut b = record();
        b.changes = serde_json::from_str(r#"{"a": {"x": 3, "y": 2}, "b": 1}"#).unwrap();

        assert_eq!(
            content_fingerprint(&a).unwrap(),
            content_fingerprint(&b).unwrap()
        );
    }

    #[test]
    fn test_each_field_is_covered() {
        let base = content_fingerprint(&record()).unwrap();

        let mut r = record();
        r.resource_id = "i-124".to_string();
        assert_ne!(content_fingerprint(&r).unwrap(), base);

        let mut r = record();
        r.operation = ChangeOperation::Delete;
        assert_ne!(content_fingerprint(&r).unwrap(), base);

        let mut r = record();
        r.actor = "mallory".to_string();
        assert_ne!(content_fingerprint(&r).unwrap(), base);

        let mut r = record();
        r.timestamp = r.timestamp + chrono::Duration::nanoseconds(1);
        assert_ne!(content_fingerprint(&r).unwrap(), base);

        let mut r = record();
        r.changes = json!({"instance_type": {"from": "t3.micro", "to": "t3.xlarge"}});
        assert_ne!(content_fingerprint(&r).unwrap(), base);
    }

    #[test]
    fn test_ledger_fields_not_covered() {
        let base = content_fingerprint(&record()).unwrap();

        let mut r = record();
        r.block_hash = Some("deadbeef".to_string());
        r.transaction_id = Some("cafe".to_string());
        r.previous_hash = Some("feed".to_string());
        assert_eq!(content_fingerprint(&r).unwrap(), base);
    }

    #[test]
    fn test_chained_fingerprint_covers_previous_hash() {
        let unchained = content_fingerprint(&record()).unwrap();
        assert_eq!(chained_fingerprint(&record()).unwrap(), unchained);

        let mut r = record();
        r.previous_hash = Some("00".repeat(32));
        assert_ne!(chained_fingerprint(&r).unwrap(), unchained);
    }

    #[test]
    fn test_transaction_id_depends_on_time() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let a = transaction_id("i-123", t);
        let b = transaction_id("i-123", t + chrono::Duration::nanoseconds(1));
        assert_ne!(a, b);
        assert_eq!(a, transaction_id("i-123", t));
        assert_ne!(a, transaction_id("i-124", t));
    }
}
