//! ChangeRecord - one unit of change data delivered by the upstream source
//!
//! Records arrive already deserialized. The logical type tag is a top-level
//! string field whose name is configured per feed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One change record as delivered by the change source.
///
/// Immutable once received; the payload is republished verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Source-assigned record id, when the payload carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Opaque deserialized change body
    pub payload: Value,
}

impl ChangeRecord {
    /// Wrap a deserialized payload, lifting an `id` field if present.
    pub fn from_payload(payload: Value) -> Self {
        let id = payload
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self { id, payload }
    }

    /// Read the logical type tag from the configured tag field.
    ///
    /// Returns `None` when the field is absent or not a string; callers
    /// treat that as an unknown record, never as an error.
    pub fn tag_value(&self, tag_field: &str) -> Option<&str> {
        self.payload.get(tag_field).and_then(Value::as_str)
    }
}

/// Logical type assigned to a record by classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    /// One of the configured known logical types
    Known(String),
    /// Matched none of the known types; routed to the dead-letter path
    Unknown,
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeTag::Known(name) => f.write_str(name),
            TypeTag::Unknown => f.write_str("unknown"),
        }
    }
}

/// One bounded, ordered collection of records handed over by the source.
///
/// One delivery is one invocation; the core never re-requests records.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Monotonic delivery number assigned by the source (for diagnostics)
    pub sequence: u64,

    /// Records in source order
    pub records: Vec<ChangeRecord>,
}

impl Delivery {
    pub fn new(sequence: u64, records: Vec<ChangeRecord>) -> Self {
        Self { sequence, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_payload_lifts_id() {
        let record = ChangeRecord::from_payload(json!({"id": "r-1", "type": "metric"}));
        assert_eq!(record.id.as_deref(), Some("r-1"));
    }

    #[test]
    fn test_from_payload_without_id() {
        let record = ChangeRecord::from_payload(json!({"type": "metric"}));
        assert!(record.id.is_none());
    }

    #[test]
    fn test_tag_value() {
        let record = ChangeRecord::from_payload(json!({"type": "metric", "v": 1}));
        assert_eq!(record.tag_value("type"), Some("metric"));
        assert_eq!(record.tag_value("kind"), None);
    }

    #[test]
    fn test_tag_value_non_string() {
        let record = ChangeRecord::from_payload(json!({"type": 42}));
        assert_eq!(record.tag_value("type"), None);
    }

    #[test]
    fn test_type_tag_display() {
        assert_eq!(TypeTag::Known("metric".into()).to_string(), "metric");
        assert_eq!(TypeTag::Unknown.to_string(), "unknown");
    }
}
