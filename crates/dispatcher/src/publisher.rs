//! TypePublisher - sequential batch submission for one type bucket

use std::sync::Arc;
use std::time::Duration;

use batcher::BatchAssembler;
use contracts::{ChangeRecord, ContractError, Transport};
use metrics::{counter, histogram};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument};

/// Result of publishing one type bucket.
///
/// `sent` counts records acknowledged by the transport before any failure;
/// partial success is reported, never rolled back.
#[derive(Debug, Default)]
pub struct PublishReport {
    /// Records successfully submitted
    pub sent: usize,
    /// Batches acknowledged by the transport
    pub batches_submitted: usize,
    /// Submitted batches whose single record exceeded the size bound
    pub oversize_batches: usize,
    /// First failure, if any; no further batches were submitted after it
    pub error: Option<ContractError>,
}

/// Publishes one type bucket as ordered, size-bounded batches.
///
/// Submissions are sequential: the next batch is only submitted once the
/// previous acknowledgement arrived, bounding in-flight batches per type
/// to one.
pub struct TypePublisher {
    transport: Arc<dyn Transport>,
    assembler: BatchAssembler,
    submit_timeout: Duration,
}

impl TypePublisher {
    pub fn new(
        transport: Arc<dyn Transport>,
        assembler: BatchAssembler,
        submit_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            assembler,
            submit_timeout,
        }
    }

    /// Publish all records of one type, in order.
    ///
    /// Stops at the first submission failure or when cancellation is
    /// observed before the next batch, reporting how many records made it.
    #[instrument(
        name = "publish_bucket",
        skip(self, records, cancel),
        fields(bucket = %type_name, records = records.len())
    )]
    pub async fn publish(
        &self,
        type_name: &str,
        records: &[ChangeRecord],
        cancel: &CancellationToken,
    ) -> PublishReport {
        let mut report = PublishReport::default();

        let batches = match self.assembler.assemble(records) {
            Ok(batches) => batches,
            Err(e) => {
                error!(bucket = %type_name, error = %e, "batch assembly failed");
                report.error = Some(e);
                return report;
            }
        };

        debug!(
            bucket = %type_name,
            batches = batches.len(),
            "bucket assembled"
        );

        for batch in batches {
            // Stop at a safe boundary; the in-flight submit is never aborted
            if cancel.is_cancelled() {
                report.error = Some(ContractError::Cancelled);
                break;
            }

            match tokio::time::timeout(self.submit_timeout, self.transport.submit(&batch)).await {
                Ok(Ok(())) => {
                    report.sent += batch.len();
                    report.batches_submitted += 1;
                    if batch.is_oversize() {
                        report.oversize_batches += 1;
                        counter!("relay_oversize_batches_total").increment(1);
                    }
                    counter!(
                        "relay_batches_submitted_total",
                        "bucket" => type_name.to_string()
                    )
                    .increment(1);
                    histogram!("relay_batch_bytes").record(batch.encoded_bytes() as f64);
                    histogram!("relay_batch_records").record(batch.len() as f64);
                }
                Ok(Err(e)) => {
                    error!(
                        bucket = %type_name,
                        sent = report.sent,
                        error = %e,
                        "batch submission failed, stopping bucket"
                    );
                    report.error = Some(e);
                    break;
                }
                Err(_) => {
                    let timeout = ContractError::TransportTimeout {
                        transport: self.transport.name().to_string(),
                        elapsed_ms: self.submit_timeout.as_millis() as u64,
                    };
                    error!(
                        bucket = %type_name,
                        sent = report.sent,
                        error = %timeout,
                        "batch submission timed out, stopping bucket"
                    );
                    report.error = Some(timeout);
                    break;
                }
            }
        }

        report
    }
}
