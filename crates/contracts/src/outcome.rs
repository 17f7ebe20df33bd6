//! DispatchOutcome - aggregate result of one invocation
//!
//! Failures are carried as values; nothing is thrown past the dispatch
//! coordinator boundary.

use std::collections::HashMap;

use serde::Serialize;

use crate::ContractError;

/// Terminal status of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationStatus {
    /// Every record was delivered or dead-lettered
    CompletedOk,
    /// At least one record failed; counts distinguish partial from total failure
    CompletedWithFailures,
}

/// Which concurrent path a failure occurred on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Batch submission to the transport failed
    TransportSubmit,
    /// Batch submission exceeded its deadline
    TransportTimeout,
    /// Dead-letter store refused the unknown records
    Deadletter,
    /// The invocation was cancelled mid-flight
    Cancelled,
}

impl FailureKind {
    /// Classify a contract error for outcome reporting.
    pub fn from_error(error: &ContractError) -> Self {
        match error {
            ContractError::TransportTimeout { .. } => Self::TransportTimeout,
            ContractError::DeadletterSubmit { .. } => Self::Deadletter,
            ContractError::Cancelled => Self::Cancelled,
            _ => Self::TransportSubmit,
        }
    }
}

/// One failed concurrent task (type publisher or dead-letter submission).
#[derive(Debug, Clone, Serialize)]
pub struct DispatchFailure {
    /// Bucket label: a known type name, or "deadletter"
    pub bucket: String,

    /// Records on this path that were not delivered
    pub failed_records: usize,

    /// Failure classification
    pub kind: FailureKind,

    /// Human-readable cause
    pub cause: String,
}

/// Aggregate result of dispatching one delivery.
///
/// Invariant: `success_count() + failed == total`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchOutcome {
    /// Total records in the delivery
    pub total: usize,

    /// Records successfully submitted to the transport, per known type
    pub sent_by_type: HashMap<String, usize>,

    /// Unrecognized records accepted by the dead-letter store
    pub deadlettered: usize,

    /// Records neither delivered nor dead-lettered
    pub failed: usize,

    /// Batches submitted to the transport across all types
    pub batches_submitted: usize,

    /// Batches whose single record exceeded the size bound
    pub oversize_batches: usize,

    /// One entry per failed concurrent task
    pub errors: Vec<DispatchFailure>,
}

impl DispatchOutcome {
    /// Records that ended up delivered or dead-lettered.
    pub fn success_count(&self) -> usize {
        self.sent_by_type.values().sum::<usize>() + self.deadlettered
    }

    /// Terminal status for the observability surface.
    pub fn status(&self) -> InvocationStatus {
        if self.failed == 0 {
            InvocationStatus::CompletedOk
        } else {
            InvocationStatus::CompletedWithFailures
        }
    }

    /// First error encountered, if any.
    pub fn first_error(&self) -> Option<&DispatchFailure> {
        self.errors.first()
    }

    /// True when every record failed (distinguished from partial failure).
    pub fn all_failed(&self) -> bool {
        self.total > 0 && self.failed == self.total
    }
}
