//! LogDeadletter - logs unknown records via tracing

use async_trait::async_trait;
use contracts::{ChangeRecord, ContractError, DeadletterStore};
use tracing::{instrument, warn};

/// Dead-letter store that only logs what it receives
pub struct LogDeadletter {
    name: String,
}

impl LogDeadletter {
    /// Create a new LogDeadletter with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl DeadletterStore for LogDeadletter {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_deadletter_submit",
        skip(self, records),
        fields(store = %self.name, records = records.len())
    )]
    async fn submit_unknown(&self, records: &[ChangeRecord]) -> Result<(), ContractError> {
        for record in records {
            warn!(
                store = %self.name,
                record_id = record.id.as_deref().unwrap_or("<none>"),
                "unknown record dead-lettered"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_log_deadletter_submit() {
        let store = LogDeadletter::new("test_dlq");
        let records = vec![ChangeRecord::from_payload(json!({"weird": true}))];
        assert!(store.submit_unknown(&records).await.is_ok());
    }
}
