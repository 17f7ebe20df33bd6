//! FileTransport - appends batch envelopes to an NDJSON file

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use contracts::{ContractError, RecordBatch, Transport};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use super::BatchEnvelope;

/// Transport that appends one JSON envelope per batch to a file
pub struct FileTransport {
    name: String,
    path: PathBuf,
}

impl FileTransport {
    /// Create a new FileTransport writing to `path`
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
            .unwrap_or_else(|| PathBuf::from("./batches.ndjson"));
        Self::new(name, path)
    }

    /// Output file path
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl Transport for FileTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_transport_submit",
        skip(self, batch),
        fields(transport = %self.name, records = batch.len())
    )]
    async fn submit(&self, batch: &RecordBatch) -> Result<(), ContractError> {
        let envelope = BatchEnvelope::from_batch(&self.name, batch)?;
        let mut line = serde_json::to_vec(&envelope)
            .map_err(|e| ContractError::transport_submit(&self.name, e.to_string()))?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| ContractError::transport_submit(&self.name, e.to_string()))?;
        file.write_all(&line)
            .await
            .map_err(|e| ContractError::transport_submit(&self.name, e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| ContractError::transport_submit(&self.name, e.to_string()))?;

        debug!(
            transport = %self.name,
            records = batch.len(),
            bytes = line.len(),
            "batch appended"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn batch_of(payloads: &[&str]) -> RecordBatch {
        let mut batch = RecordBatch::open();
        for p in payloads {
            batch.try_add(Bytes::copy_from_slice(p.as_bytes()), 1 << 20);
        }
        batch
    }

    #[tokio::test]
    async fn test_file_transport_appends_envelopes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batches.ndjson");
        let transport = FileTransport::new("test_file", &path).unwrap();

        transport
            .submit(&batch_of(&[r#"{"type":"a","n":0}"#, r#"{"type":"a","n":1}"#]))
            .await
            .unwrap();
        transport
            .submit(&batch_of(&[r#"{"type":"b","n":2}"#]))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["record_count"], 2);
        assert_eq!(first["records"][1]["n"], 1);
        assert_eq!(first["oversize"], false);
    }

    #[tokio::test]
    async fn test_file_transport_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/batches.ndjson");
        let transport = FileTransport::new("test_file", &path).unwrap();

        transport
            .submit(&batch_of(&[r#"{"type":"a"}"#]))
            .await
            .unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_file_transport_rejects_non_json_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batches.ndjson");
        let transport = FileTransport::new("test_file", &path).unwrap();

        let result = transport.submit(&batch_of(&["not json"])).await;
        assert!(matches!(
            result,
            Err(ContractError::TransportSubmit { .. })
        ));
    }
}
