//! RelayBlueprint - Config Loader output
//!
//! Describes one relay deployment: the feed's known types, the upstream
//! source, the downstream transport, and the dead-letter store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete relay configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Feed settings: tag field and known logical types
    pub feed: FeedConfig,

    /// Upstream change source
    pub source: SourceConfig,

    /// Downstream transport
    pub transport: TransportConfig,

    /// Dead-letter store for unrecognized records
    pub deadletter: DeadletterConfig,
}

/// Feed settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Top-level payload field carrying the logical type tag
    #[serde(default = "default_tag_field")]
    pub tag_field: String,

    /// Known logical types; anything else is dead-lettered
    pub known_types: Vec<String>,
}

fn default_tag_field() -> String {
    "type".to_string()
}

/// Change source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source kind
    pub kind: SourceKind,

    /// Records per delivery (one delivery = one invocation)
    #[serde(default = "default_delivery_size")]
    pub delivery_size: usize,

    /// Kind-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_delivery_size() -> usize {
    100
}

/// Source kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Replay records from an NDJSON file
    Replay,
    /// Generate deterministic synthetic records
    Mock,
}

/// Transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Transport name
    pub name: String,

    /// Transport kind
    pub kind: TransportKind,

    /// Maximum encoded batch size in bytes
    #[serde(default = "default_max_batch_bytes")]
    pub max_batch_bytes: usize,

    /// Per-submission deadline in milliseconds
    #[serde(default = "default_submit_timeout_ms")]
    pub submit_timeout_ms: u64,

    /// Kind-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_max_batch_bytes() -> usize {
    1_048_576 // 1 MiB
}

fn default_submit_timeout_ms() -> u64 {
    5_000
}

/// Transport kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Log batch summaries
    Log,
    /// Append batch envelopes to an NDJSON file
    File,
    /// Fire-and-forget datagram per batch (UDP)
    Udp,
}

/// Dead-letter store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadletterConfig {
    /// Store name
    pub name: String,

    /// Store kind
    pub kind: DeadletterKind,

    /// Kind-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Dead-letter store kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadletterKind {
    /// Log unknown records
    Log,
    /// Append unknown records to an NDJSON file
    File,
}

impl TransportConfig {
    /// Per-submission deadline as a `Duration`.
    pub fn submit_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.submit_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_blueprint() -> RelayBlueprint {
        RelayBlueprint {
            version: ConfigVersion::V1,
            feed: FeedConfig {
                tag_field: "type".into(),
                known_types: vec!["device_metric".into(), "device_event".into()],
            },
            source: SourceConfig {
                kind: SourceKind::Mock,
                delivery_size: 50,
                params: HashMap::new(),
            },
            transport: TransportConfig {
                name: "hub".into(),
                kind: TransportKind::Log,
                max_batch_bytes: 1024,
                submit_timeout_ms: 200,
                params: HashMap::new(),
            },
            deadletter: DeadletterConfig {
                name: "dlq".into(),
                kind: DeadletterKind::Log,
                params: HashMap::new(),
            },
        }
    }

    #[test]
    fn test_defaults_applied_on_deserialize() {
        let json = r#"{
            "feed": { "known_types": ["a"] },
            "source": { "kind": "mock" },
            "transport": { "name": "t", "kind": "log" },
            "deadletter": { "name": "d", "kind": "log" }
        }"#;
        let bp: RelayBlueprint = serde_json::from_str(json).unwrap();
        assert_eq!(bp.feed.tag_field, "type");
        assert_eq!(bp.source.delivery_size, 100);
        assert_eq!(bp.transport.max_batch_bytes, 1_048_576);
        assert_eq!(bp.transport.submit_timeout_ms, 5_000);
    }

    #[test]
    fn test_submit_timeout_duration() {
        let bp = sample_blueprint();
        assert_eq!(
            bp.transport.submit_timeout(),
            std::time::Duration::from_millis(200)
        );
    }
}
