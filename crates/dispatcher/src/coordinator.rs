//! DispatchCoordinator - classify, fan out, join, aggregate

use std::sync::Arc;
use std::time::Duration;

use batcher::BatchAssembler;
use classifier::{Classifier, TypeBuckets};
use contracts::{
    ChangeRecord, ContractError, DeadletterStore, Delivery, DispatchFailure, DispatchOutcome,
    FailureKind, InvocationStatus, RelayBlueprint, Transport,
};
use metrics::counter;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, instrument, warn, Instrument, Span};

use crate::error::DispatcherError;
use crate::publisher::TypePublisher;
use crate::{create_deadletter, create_transport};

/// Result of one concurrent task within an invocation.
enum TaskResult {
    Bucket {
        type_name: String,
        sent: usize,
        batches_submitted: usize,
        oversize_batches: usize,
        failed: usize,
        error: Option<ContractError>,
    },
    Deadletter {
        accepted: usize,
        failed: usize,
        error: Option<ContractError>,
    },
}

/// Entry point of the dispatch pipeline.
///
/// One `dispatch` call is one invocation: every entity it creates is
/// consumed before it returns, and failures come back as values in the
/// outcome, never as panics or errors crossing the coordinator boundary.
pub struct DispatchCoordinator {
    classifier: Classifier,
    assembler: BatchAssembler,
    transport: Arc<dyn Transport>,
    deadletter: Arc<dyn DeadletterStore>,
    submit_timeout: Duration,
}

impl DispatchCoordinator {
    pub fn new(
        classifier: Classifier,
        assembler: BatchAssembler,
        transport: Arc<dyn Transport>,
        deadletter: Arc<dyn DeadletterStore>,
        submit_timeout: Duration,
    ) -> Self {
        Self {
            classifier,
            assembler,
            transport,
            deadletter,
            submit_timeout,
        }
    }

    /// Dispatch one delivery and aggregate the outcome.
    ///
    /// Launches one publisher task per populated type bucket plus one
    /// dead-letter submission, all concurrent, and suspends until every
    /// task completed (a join, not a queue).
    #[instrument(
        name = "dispatch",
        skip(self, delivery, cancel),
        fields(
            sequence = delivery.sequence,
            total = delivery.len(),
            unknown = tracing::field::Empty,
            success = tracing::field::Empty,
            failed = tracing::field::Empty,
            status = tracing::field::Empty
        )
    )]
    pub async fn dispatch(&self, delivery: Delivery, cancel: &CancellationToken) -> DispatchOutcome {
        let total = delivery.len();
        let buckets = TypeBuckets::partition(&self.classifier, delivery.records);
        let per_type_counts = buckets.known_counts();
        let unknown_count = buckets.unknown_count();

        Span::current().record("unknown", unknown_count);
        info!(
            per_type = ?per_type_counts,
            unknown = unknown_count,
            "delivery classified"
        );

        let (known, unknown) = buckets.into_parts();

        let mut tasks: JoinSet<TaskResult> = JoinSet::new();

        for (type_name, records) in known {
            let publisher = TypePublisher::new(
                Arc::clone(&self.transport),
                self.assembler,
                self.submit_timeout,
            );
            let task_cancel = cancel.clone();
            let span = info_span!("type_publisher", bucket = %type_name);
            tasks.spawn(
                async move {
                    let bucket_size = records.len();
                    let report = publisher.publish(&type_name, &records, &task_cancel).await;
                    TaskResult::Bucket {
                        type_name,
                        sent: report.sent,
                        batches_submitted: report.batches_submitted,
                        oversize_batches: report.oversize_batches,
                        failed: bucket_size - report.sent,
                        error: report.error,
                    }
                }
                .instrument(span),
            );
        }

        if !unknown.is_empty() {
            let deadletter = Arc::clone(&self.deadletter);
            let task_cancel = cancel.clone();
            let timeout = self.submit_timeout;
            let span = info_span!("deadletter_submit", records = unknown.len());
            tasks.spawn(
                async move { submit_deadletter(deadletter, unknown, &task_cancel, timeout).await }
                    .instrument(span),
            );
        }

        let outcome = self.aggregate(total, tasks).await;

        let span = Span::current();
        span.record("success", outcome.success_count());
        span.record("failed", outcome.failed);
        match outcome.status() {
            InvocationStatus::CompletedOk => {
                span.record("status", "ok");
                info!(
                    total = outcome.total,
                    success = outcome.success_count(),
                    batches = outcome.batches_submitted,
                    "invocation completed"
                );
            }
            InvocationStatus::CompletedWithFailures => {
                let description = outcome
                    .first_error()
                    .map(|e| e.cause.clone())
                    .unwrap_or_default();
                span.record("status", "error");
                warn!(
                    total = outcome.total,
                    success = outcome.success_count(),
                    failed = outcome.failed,
                    all_failed = outcome.all_failed(),
                    description = %description,
                    "invocation completed with failures"
                );
            }
        }

        record_invocation_metrics(&outcome);
        outcome
    }

    /// Join all tasks and fold their results into one outcome.
    async fn aggregate(&self, total: usize, mut tasks: JoinSet<TaskResult>) -> DispatchOutcome {
        let mut outcome = DispatchOutcome {
            total,
            ..Default::default()
        };

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(TaskResult::Bucket {
                    type_name,
                    sent,
                    batches_submitted,
                    oversize_batches,
                    failed,
                    error,
                }) => {
                    outcome.sent_by_type.insert(type_name.clone(), sent);
                    outcome.batches_submitted += batches_submitted;
                    outcome.oversize_batches += oversize_batches;
                    if let Some(error) = error {
                        outcome.errors.push(DispatchFailure {
                            bucket: type_name,
                            failed_records: failed,
                            kind: FailureKind::from_error(&error),
                            cause: error.to_string(),
                        });
                    }
                }
                Ok(TaskResult::Deadletter {
                    accepted,
                    failed,
                    error,
                }) => {
                    outcome.deadlettered = accepted;
                    if let Some(error) = error {
                        outcome.errors.push(DispatchFailure {
                            bucket: "deadletter".to_string(),
                            failed_records: failed,
                            kind: FailureKind::from_error(&error),
                            cause: error.to_string(),
                        });
                    }
                }
                Err(join_error) => {
                    // A panicked task loses its bucket label; its records
                    // are still counted failed by the partition arithmetic
                    error!(error = %join_error, "dispatch task panicked");
                    outcome.errors.push(DispatchFailure {
                        bucket: "<panicked>".to_string(),
                        failed_records: 0,
                        kind: FailureKind::TransportSubmit,
                        cause: join_error.to_string(),
                    });
                }
            }
        }

        outcome.failed = total - outcome.success_count();
        outcome
    }
}

/// Submit the unknown bucket to the dead-letter store.
async fn submit_deadletter(
    deadletter: Arc<dyn DeadletterStore>,
    records: Vec<ChangeRecord>,
    cancel: &CancellationToken,
    submit_timeout: Duration,
) -> TaskResult {
    let count = records.len();

    if cancel.is_cancelled() {
        return TaskResult::Deadletter {
            accepted: 0,
            failed: count,
            error: Some(ContractError::Cancelled),
        };
    }

    match tokio::time::timeout(submit_timeout, deadletter.submit_unknown(&records)).await {
        Ok(Ok(())) => {
            counter!("relay_records_deadlettered_total").increment(count as u64);
            TaskResult::Deadletter {
                accepted: count,
                failed: 0,
                error: None,
            }
        }
        Ok(Err(e)) => {
            error!(records = count, error = %e, "deadletter submission failed");
            TaskResult::Deadletter {
                accepted: 0,
                failed: count,
                error: Some(e),
            }
        }
        Err(_) => {
            let error = ContractError::deadletter_submit(
                deadletter.name(),
                format!("timed out after {}ms", submit_timeout.as_millis()),
            );
            error!(records = count, error = %error, "deadletter submission timed out");
            TaskResult::Deadletter {
                accepted: 0,
                failed: count,
                error: Some(error),
            }
        }
    }
}

/// Record per-invocation counters.
fn record_invocation_metrics(outcome: &DispatchOutcome) {
    let status = match outcome.status() {
        InvocationStatus::CompletedOk => "ok",
        InvocationStatus::CompletedWithFailures => "error",
    };
    counter!("relay_invocations_total", "status" => status).increment(1);
    counter!("relay_records_total").increment(outcome.total as u64);
    counter!("relay_records_failed_total").increment(outcome.failed as u64);
    for (type_name, sent) in &outcome.sent_by_type {
        counter!("relay_records_sent_total", "bucket" => type_name.clone())
            .increment(*sent as u64);
    }
}

/// Convenience function to build a coordinator from a blueprint.
#[instrument(name = "dispatcher_create", skip(blueprint))]
pub async fn create_coordinator(
    blueprint: &RelayBlueprint,
) -> Result<DispatchCoordinator, DispatcherError> {
    let transport = create_transport(&blueprint.transport).await?;
    let deadletter = create_deadletter(&blueprint.deadletter)?;

    Ok(DispatchCoordinator::new(
        Classifier::from_feed(&blueprint.feed),
        BatchAssembler::new(blueprint.transport.max_batch_bytes),
        transport,
        deadletter,
        blueprint.transport.submit_timeout(),
    ))
}
