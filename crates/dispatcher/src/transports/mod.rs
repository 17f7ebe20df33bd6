//! Concrete transport implementations and factory

mod file;
mod log;
mod udp;

pub use file::FileTransport;
pub use log::LogTransport;
pub use udp::{UdpFormat, UdpTransport};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use contracts::{ContractError, RecordBatch, Transport, TransportConfig, TransportKind};
use serde::Serialize;
use tracing::instrument;

use crate::error::DispatcherError;

/// Wire envelope wrapping one sealed batch.
///
/// Payloads are re-parsed into JSON values so the envelope stays readable
/// in JSON form; they were produced by the assembler, so parsing is
/// infallible short of an assembler bug.
#[derive(Debug, Serialize)]
pub(crate) struct BatchEnvelope {
    pub transport: String,
    pub sent_at: DateTime<Utc>,
    pub record_count: usize,
    pub encoded_bytes: usize,
    pub oversize: bool,
    pub records: Vec<serde_json::Value>,
}

impl BatchEnvelope {
    pub(crate) fn from_batch(
        transport: &str,
        batch: &RecordBatch,
    ) -> Result<Self, ContractError> {
        let records = batch
            .payloads()
            .iter()
            .map(|payload| serde_json::from_slice(payload))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                ContractError::transport_submit(transport, format!("payload re-parse error: {e}"))
            })?;

        Ok(Self {
            transport: transport.to_string(),
            sent_at: Utc::now(),
            record_count: batch.len(),
            encoded_bytes: batch.encoded_bytes(),
            oversize: batch.is_oversize(),
            records,
        })
    }
}

/// Create a transport client from configuration
#[instrument(
    name = "transport_create",
    skip(config),
    fields(transport = %config.name, kind = ?config.kind)
)]
pub async fn create_transport(
    config: &TransportConfig,
) -> Result<Arc<dyn Transport>, DispatcherError> {
    match config.kind {
        TransportKind::Log => Ok(Arc::new(LogTransport::new(&config.name))),
        TransportKind::File => {
            let transport = FileTransport::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::transport_creation(&config.name, e.to_string()))?;
            Ok(Arc::new(transport))
        }
        TransportKind::Udp => {
            let transport = UdpTransport::from_params(&config.name, &config.params)
                .await
                .map_err(|e| DispatcherError::transport_creation(&config.name, e.to_string()))?;
            Ok(Arc::new(transport))
        }
    }
}
