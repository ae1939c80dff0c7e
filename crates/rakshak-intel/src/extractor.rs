// SPDX-FileCopyrightText: 2026 Rakshak Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payload normalization and the idempotent merge into the session record.
//!
//! Raw extraction payloads from the reasoning provider are arbitrary-shaped:
//! fields may be missing, lists may mix strings with structured objects, and
//! the same value may be re-extracted on every turn. Normalization flattens
//! each value to a canonical display string, and the merge keys entries on a
//! case-insensitive, whitespace-collapsed form so repeats never produce
//! duplicates or rewrite what was already captured.

use serde_json::Value;
use tracing::debug;

use rakshak_core::IntelligencePayload;

use crate::types::{IndicatorClass, IndicatorEntry, IntelligenceRecord, MergeReport};

impl IntelligenceRecord {
    /// Folds one turn's normalized payload into the record.
    ///
    /// For each class, each value is keyed and looked up; known keys are
    /// skipped outright (first-seen confidence and casing win), unknown keys
    /// append a new entry stamped `now_ms` with the class default confidence.
    /// Merging the same payload twice is a no-op the second time.
    pub fn merge(&mut self, payload: &IntelligencePayload, now_ms: i64) -> MergeReport {
        let mut report = MergeReport::default();

        let classes = [
            (IndicatorClass::UpiId, &payload.upi_ids),
            (IndicatorClass::BankAccount, &payload.bank_accounts),
            (IndicatorClass::IfscCode, &payload.ifsc_codes),
            (IndicatorClass::PhoneNumber, &payload.phone_numbers),
            (IndicatorClass::PhishingUrl, &payload.phishing_urls),
        ];

        for (class, values) in classes {
            for value in values {
                if self.insert(class, value, now_ms) {
                    report.new_entries += 1;
                }
            }
        }

        report
    }

    /// Inserts one value into a class list. Returns true if the value was new.
    fn insert(&mut self, class: IndicatorClass, value: &str, now_ms: i64) -> bool {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return false;
        }

        let key = normalize_key(trimmed);
        if !self.seen.insert((class, key)) {
            debug!(class = %class, value = trimmed, "indicator already known, skipping");
            return false;
        }

        let entry = IndicatorEntry {
            value: trimmed.to_string(),
            confidence: class.default_confidence(),
            first_seen: now_ms,
        };

        match class {
            IndicatorClass::UpiId => self.upi_ids.push(entry),
            IndicatorClass::BankAccount => self.bank_accounts.push(entry),
            IndicatorClass::IfscCode => self.ifsc_codes.push(entry),
            IndicatorClass::PhoneNumber => self.phone_numbers.push(entry),
            IndicatorClass::PhishingUrl => self.phishing_urls.push(entry),
        }
        true
    }
}

/// Class-scoped comparison key: lower-cased with runs of whitespace collapsed.
/// Display values are never altered by this.
pub fn normalize_key(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Normalizes a raw `extracted_intelligence` object into the canonical
/// per-turn payload.
///
/// Missing or non-array fields become empty lists. List items that are
/// strings pass through trimmed; structured items (objects arriving for
/// bank accounts, stray numbers) are serialized to a stable JSON string with
/// sorted object keys so the same account details always produce the same
/// dedup key. Nulls and empty strings are dropped.
pub fn normalize_payload(raw: &Value) -> IntelligencePayload {
    IntelligencePayload {
        upi_ids: normalize_list(raw.get("upi_ids")),
        bank_accounts: normalize_list(raw.get("bank_accounts")),
        ifsc_codes: normalize_list(raw.get("ifsc_codes")),
        phone_numbers: normalize_list(raw.get("phone_numbers")),
        phishing_urls: normalize_list(raw.get("phishing_urls")),
    }
}

fn normalize_list(field: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = field else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Null => None,
            other => Some(canonical_json(other)),
        })
        .collect()
}

/// Serializes a JSON value with all object keys sorted, recursively.
fn canonical_json(value: &Value) -> String {
    fn sort(value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: std::collections::BTreeMap<_, _> =
                    map.iter().map(|(k, v)| (k.clone(), sort(v))).collect();
                serde_json::to_value(sorted).unwrap_or(Value::Null)
            }
            Value::Array(items) => Value::Array(items.iter().map(sort).collect()),
            other => other.clone(),
        }
    }
    sort(value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload_with_upi(value: &str) -> IntelligencePayload {
        IntelligencePayload {
            upi_ids: vec![value.to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn merge_inserts_new_entry_with_defaults() {
        let mut record = IntelligenceRecord::new();
        let report = record.merge(&payload_with_upi("fraud@upi"), 1000);

        assert_eq!(report.new_entries, 1);
        assert_eq!(record.upi_ids.len(), 1);
        assert_eq!(record.upi_ids[0].value, "fraud@upi");
        assert_eq!(record.upi_ids[0].confidence, 98);
        assert_eq!(record.upi_ids[0].first_seen, 1000);
    }

    #[test]
    fn merge_is_idempotent() {
        let payload = IntelligencePayload {
            upi_ids: vec!["fraud@upi".into()],
            phone_numbers: vec!["+919999999999".into()],
            ..Default::default()
        };

        let mut once = IntelligenceRecord::new();
        once.merge(&payload, 1000);

        let mut twice = IntelligenceRecord::new();
        twice.merge(&payload, 1000);
        let report = twice.merge(&payload, 2000);

        assert_eq!(report.new_entries, 0);
        assert!(!report.has_new());
        assert_eq!(once.upi_ids, twice.upi_ids);
        assert_eq!(once.phone_numbers, twice.phone_numbers);
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn first_seen_confidence_and_timestamp_are_stable() {
        let mut record = IntelligenceRecord::new();
        record.merge(&payload_with_upi("fraud@upi"), 1000);
        record.merge(&payload_with_upi("FRAUD@UPI"), 9999);

        assert_eq!(record.upi_ids.len(), 1);
        assert_eq!(record.upi_ids[0].confidence, 98);
        assert_eq!(record.upi_ids[0].first_seen, 1000);
        // Display keeps the first-seen casing.
        assert_eq!(record.upi_ids[0].value, "fraud@upi");
    }

    #[test]
    fn same_phone_across_turns_yields_one_entry() {
        let mut record = IntelligenceRecord::new();
        let turn1 = IntelligencePayload {
            phone_numbers: vec!["+919999999999".into()],
            ..Default::default()
        };
        let turn2 = IntelligencePayload {
            phone_numbers: vec!["+919999999999".into()],
            ..Default::default()
        };

        assert_eq!(record.merge(&turn1, 1).new_entries, 1);
        assert_eq!(record.merge(&turn2, 2).new_entries, 0);
        assert_eq!(record.phone_numbers.len(), 1);
    }

    #[test]
    fn whitespace_collapsed_for_comparison_only() {
        let mut record = IntelligenceRecord::new();
        record.merge(&payload_with_upi("fraud @ upi"), 1);
        let report = record.merge(&payload_with_upi("  fraud  @  upi  "), 2);

        assert_eq!(report.new_entries, 0);
        assert_eq!(record.upi_ids[0].value, "fraud @ upi");
    }

    #[test]
    fn dedup_is_class_scoped() {
        let mut record = IntelligenceRecord::new();
        let payload = IntelligencePayload {
            upi_ids: vec!["9999999999".into()],
            phone_numbers: vec!["9999999999".into()],
            ..Default::default()
        };
        let report = record.merge(&payload, 1);
        assert_eq!(report.new_entries, 2);
    }

    #[test]
    fn blank_values_are_dropped() {
        let mut record = IntelligenceRecord::new();
        let report = record.merge(&payload_with_upi("   "), 1);
        assert_eq!(report.new_entries, 0);
        assert!(record.is_empty());
    }

    #[test]
    fn normalize_payload_full_object() {
        let raw = json!({
            "upi_ids": ["fraud@upi"],
            "bank_accounts": ["1234567890"],
            "ifsc_codes": ["HDFC0001234"],
            "phone_numbers": ["+919999999999"],
            "phishing_urls": ["http://kyc-update.example"]
        });
        let payload = normalize_payload(&raw);
        assert_eq!(payload.upi_ids, vec!["fraud@upi"]);
        assert_eq!(payload.bank_accounts, vec!["1234567890"]);
        assert_eq!(payload.ifsc_codes, vec!["HDFC0001234"]);
        assert_eq!(payload.phone_numbers, vec!["+919999999999"]);
        assert_eq!(payload.phishing_urls, vec!["http://kyc-update.example"]);
    }

    #[test]
    fn normalize_payload_missing_and_mistyped_fields() {
        let raw = json!({
            "upi_ids": "not-an-array",
            "phone_numbers": [null, "", "  +911234  "]
        });
        let payload = normalize_payload(&raw);
        assert!(payload.upi_ids.is_empty());
        assert!(payload.bank_accounts.is_empty());
        assert_eq!(payload.phone_numbers, vec!["+911234"]);
    }

    #[test]
    fn bank_account_objects_serialize_stably() {
        let a = json!({"bank_accounts": [{"account": "123", "name": "SBI"}]});
        let b = json!({"bank_accounts": [{"name": "SBI", "account": "123"}]});

        let pa = normalize_payload(&a);
        let pb = normalize_payload(&b);
        assert_eq!(pa.bank_accounts, pb.bank_accounts);

        let mut record = IntelligenceRecord::new();
        record.merge(&pa, 1);
        let report = record.merge(&pb, 2);
        assert_eq!(report.new_entries, 0);
        assert_eq!(record.bank_accounts.len(), 1);
    }

    #[test]
    fn numeric_account_values_are_stringified() {
        let raw = json!({"bank_accounts": [987654321]});
        let payload = normalize_payload(&raw);
        assert_eq!(payload.bank_accounts, vec!["987654321"]);
    }

    #[test]
    fn normalize_key_examples() {
        assert_eq!(normalize_key("  Fraud@UPI "), "fraud@upi");
        assert_eq!(normalize_key("A  B\tC"), "a b c");
    }
}
