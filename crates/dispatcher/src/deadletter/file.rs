//! FileDeadletter - appends unknown records to an NDJSON file

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contracts::{ChangeRecord, ContractError, DeadletterStore};
use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{instrument, warn};

/// One dead-lettered record, timestamped for later triage
#[derive(Debug, Serialize)]
struct DeadletterEnvelope<'a> {
    store: &'a str,
    received_at: DateTime<Utc>,
    record: &'a serde_json::Value,
}

/// Dead-letter store that appends one JSON line per record
pub struct FileDeadletter {
    name: String,
    path: PathBuf,
}

impl FileDeadletter {
    /// Create a new FileDeadletter writing to `path`
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Ok(Self {
            name: name.into(),
            path,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./deadletter.ndjson"));
        Self::new(name, path)
    }

    /// Output file path
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl DeadletterStore for FileDeadletter {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_deadletter_submit",
        skip(self, records),
        fields(store = %self.name, records = records.len())
    )]
    async fn submit_unknown(&self, records: &[ChangeRecord]) -> Result<(), ContractError> {
        let received_at = Utc::now();
        let mut lines = Vec::new();

        for record in records {
            let envelope = DeadletterEnvelope {
                store: &self.name,
                received_at,
                record: &record.payload,
            };
            let line = serde_json::to_vec(&envelope)
                .map_err(|e| ContractError::deadletter_submit(&self.name, e.to_string()))?;
            lines.extend_from_slice(&line);
            lines.push(b'\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| ContractError::deadletter_submit(&self.name, e.to_string()))?;
        file.write_all(&lines)
            .await
            .map_err(|e| ContractError::deadletter_submit(&self.name, e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| ContractError::deadletter_submit(&self.name, e.to_string()))?;

        warn!(
            store = %self.name,
            records = records.len(),
            path = %self.path.display(),
            "unknown records dead-lettered"
        );
        Ok(())
    }
}
