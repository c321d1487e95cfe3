//! Core data types used throughout the service

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::StoreError;
use crate::lookup::normalize_status;

/// Transaction record as written by the payment processor
///
/// Only `status` and `amount` feed the response. The remaining fields are
/// carried for logging. Fields that hold a non-string JSON value are read as
/// absent rather than failing the whole record. A repeated key keeps its
/// last value, and `created_at`/`updated_at` win over their camelCase forms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionRecord {
    /// Raw status string, e.g. `created`, `sended`, `successed`
    pub status: Option<String>,

    /// Transaction amount, any JSON value
    pub amount: Option<Value>,

    /// Transaction type discriminator (`type`)
    pub kind: Option<String>,

    /// Site identifier
    pub site: Option<String>,

    /// Account username
    pub username: Option<String>,

    /// Creation timestamp
    pub created_at: Option<String>,

    /// Last update timestamp
    pub updated_at: Option<String>,
}

impl<'de> Deserialize<'de> for TransactionRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Map::<String, Value>::deserialize(deserializer).map(Self::from_fields)
    }
}

fn text(fields: &Map<String, Value>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| fields.get(*name).and_then(Value::as_str))
        .map(str::to_string)
}

impl TransactionRecord {
    fn from_fields(mut fields: Map<String, Value>) -> Self {
        Self {
            status: text(&fields, &["status"]),
            kind: text(&fields, &["type"]),
            site: text(&fields, &["site"]),
            username: text(&fields, &["username"]),
            created_at: text(&fields, &["created_at", "createdAt"]),
            updated_at: text(&fields, &["updated_at", "updatedAt"]),
            amount: fields.remove("amount"),
        }
    }

    /// Parse a raw stored value. Anything but a JSON object is malformed.
    pub fn parse(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Numeric amount, `0` when missing or not a number
    pub fn amount(&self) -> Number {
        match &self.amount {
            Some(Value::Number(n)) => n.clone(),
            _ => Number::from(0),
        }
    }
}

/// Result of resolving a `(site, id)` pair against the store
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// A record was found under `key`
    Found {
        /// Key the record was read from
        key: String,
        /// Parsed record
        record: TransactionRecord,
    },

    /// Every candidate key cleanly missed
    Absent,

    /// No candidate hit and at least one read failed
    Failed {
        /// Last store error observed
        reason: StoreError,
    },
}

impl LookupOutcome {
    /// Short label used in logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            LookupOutcome::Found { .. } => "found",
            LookupOutcome::Absent => "not_found",
            LookupOutcome::Failed { .. } => "error",
        }
    }

    /// Collapse the outcome to the response envelope.
    ///
    /// `Absent` and `Failed` both answer pending with a zero amount.
    pub fn into_envelope(self) -> StatusEnvelope {
        match self {
            LookupOutcome::Found { record, .. } => StatusEnvelope::new(StatusData {
                status: normalize_status(record.status.as_deref()),
                amount: record.amount(),
            }),
            LookupOutcome::Absent | LookupOutcome::Failed { .. } => {
                StatusEnvelope::new(StatusData::pending())
            }
        }
    }
}

/// Payload of the business endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusData {
    /// Normalized status
    pub status: String,
    /// Transaction amount
    pub amount: Number,
}

impl StatusData {
    /// The pending default used for misses and failures
    pub fn pending() -> Self {
        Self {
            status: "pending".to_string(),
            amount: Number::from(0),
        }
    }
}

/// Fixed-shape wrapper returned by the business endpoint.
///
/// `status` means the request was handled, not that the transaction
/// succeeded, so it is `true` on every path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEnvelope {
    /// Request handled
    pub status: bool,
    /// Always empty
    pub message: String,
    /// Transaction status and amount
    pub data: StatusData,
}

impl StatusEnvelope {
    /// Wrap a payload
    pub fn new(data: StatusData) -> Self {
        Self {
            status: true,
            message: String::new(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_record() {
        let raw = r#"{
            "status": "SENDED",
            "amount": 1250,
            "type": "deposit",
            "site": "site-a",
            "username": "alice",
            "createdAt": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:05:00Z"
        }"#;
        let record = TransactionRecord::parse(raw).unwrap();
        assert_eq!(record.status.as_deref(), Some("SENDED"));
        assert_eq!(record.amount(), Number::from(1250));
        assert_eq!(record.kind.as_deref(), Some("deposit"));
        assert_eq!(record.username.as_deref(), Some("alice"));
        assert_eq!(record.created_at.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(record.updated_at.as_deref(), Some("2024-05-01T10:05:00Z"));
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(TransactionRecord::parse("not json").is_err());
        assert!(TransactionRecord::parse("[1, 2]").is_err());
        assert!(TransactionRecord::parse("\"pending\"").is_err());
        assert!(TransactionRecord::parse("{\"status\":").is_err());
    }

    #[test]
    fn test_duplicate_and_aliased_keys_are_accepted() {
        let record = TransactionRecord::parse(
            r#"{"status":"successed","amount":500,"created_at":"a","createdAt":"b"}"#,
        )
        .unwrap();
        assert_eq!(record.status.as_deref(), Some("successed"));
        assert_eq!(record.amount(), Number::from(500));
        assert_eq!(record.created_at.as_deref(), Some("a"));

        let record =
            TransactionRecord::parse(r#"{"status":"created","amount":5,"status":"successed"}"#)
                .unwrap();
        assert_eq!(record.status.as_deref(), Some("successed"));
    }

    #[test]
    fn test_non_string_fields_read_as_absent() {
        let record = TransactionRecord::parse(r#"{"status": 3, "createdAt": 1714557600}"#).unwrap();
        assert!(record.status.is_none());
        assert!(record.created_at.is_none());
    }

    #[test]
    fn test_amount_coercion() {
        let cases = [
            (json!({"amount": 500}), Number::from(500)),
            (json!({"amount": 0}), Number::from(0)),
            (json!({"amount": "500"}), Number::from(0)),
            (json!({"amount": null}), Number::from(0)),
            (json!({}), Number::from(0)),
        ];
        for (value, expected) in cases {
            let record: TransactionRecord = serde_json::from_value(value).unwrap();
            assert_eq!(record.amount(), expected);
        }

        let record: TransactionRecord = serde_json::from_value(json!({"amount": 12.5})).unwrap();
        assert_eq!(record.amount().as_f64(), Some(12.5));
    }

    #[test]
    fn test_envelope_for_each_outcome() {
        let found = LookupOutcome::Found {
            key: "kob:transaction:deposit:s:1".to_string(),
            record: TransactionRecord::parse(r#"{"status":"created","amount":70}"#).unwrap(),
        };
        assert_eq!(
            serde_json::to_value(found.into_envelope()).unwrap(),
            json!({"status": true, "message": "", "data": {"status": "pending", "amount": 70}})
        );

        let pending = json!({"status": true, "message": "", "data": {"status": "pending", "amount": 0}});
        assert_eq!(
            serde_json::to_value(LookupOutcome::Absent.into_envelope()).unwrap(),
            pending
        );
        let failed = LookupOutcome::Failed {
            reason: StoreError::Unavailable,
        };
        assert_eq!(serde_json::to_value(failed.into_envelope()).unwrap(), pending);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(LookupOutcome::Absent.label(), "not_found");
        let failed = LookupOutcome::Failed {
            reason: StoreError::Timeout(5000),
        };
        assert_eq!(failed.label(), "error");
    }
}
