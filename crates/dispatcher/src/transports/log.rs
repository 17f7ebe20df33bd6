//! LogTransport - logs batch summaries via tracing

use async_trait::async_trait;
use contracts::{ContractError, RecordBatch, Transport};
use tracing::{info, instrument};

/// Transport that logs batch summaries for debugging
pub struct LogTransport {
    name: String,
}

impl LogTransport {
    /// Create a new LogTransport with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Transport for LogTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_transport_submit",
        skip(self, batch),
        fields(transport = %self.name, records = batch.len())
    )]
    async fn submit(&self, batch: &RecordBatch) -> Result<(), ContractError> {
        info!(
            transport = %self.name,
            records = batch.len(),
            encoded_bytes = batch.encoded_bytes(),
            oversize = batch.is_oversize(),
            "batch submitted"
        );
        Ok(())
    }
}
