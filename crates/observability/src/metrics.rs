//! Invocation statistics aggregation
//!
//! Aggregates `DispatchOutcome` values in memory for end-of-run summaries.
//! Live counters and histograms are emitted on the dispatch path itself via
//! the `metrics` facade; this module only folds outcomes for reporting.

use std::collections::HashMap;

use contracts::{DispatchOutcome, InvocationStatus};

/// Aggregates outcomes across the invocations of one run.
#[derive(Debug, Clone, Default)]
pub struct RelayStatsAggregator {
    /// Total invocations observed
    pub total_invocations: u64,

    /// Invocations that ended with at least one failure
    pub failed_invocations: u64,

    /// Invocations where every record failed
    pub total_failure_invocations: u64,

    /// Records across all invocations
    pub total_records: u64,

    /// Records acknowledged by the transport
    pub records_sent: u64,

    /// Records accepted by the dead-letter store
    pub records_deadlettered: u64,

    /// Records neither delivered nor dead-lettered
    pub records_failed: u64,

    /// Oversize batches emitted
    pub oversize_batches: u64,

    /// Sent counts per logical type
    pub sent_by_type: HashMap<String, u64>,

    /// Failure counts per bucket label
    pub failures_by_bucket: HashMap<String, u64>,

    /// Records-per-invocation statistics
    pub records_stats: RunningStats,

    /// Batches-per-invocation statistics
    pub batches_stats: RunningStats,
}

impl RelayStatsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one invocation outcome into the running totals
    pub fn update(&mut self, outcome: &DispatchOutcome) {
        self.total_invocations += 1;
        if outcome.status() == InvocationStatus::CompletedWithFailures {
            self.failed_invocations += 1;
        }
        if outcome.all_failed() {
            self.total_failure_invocations += 1;
        }

        self.total_records += outcome.total as u64;
        self.records_deadlettered += outcome.deadlettered as u64;
        self.records_failed += outcome.failed as u64;
        self.oversize_batches += outcome.oversize_batches as u64;

        for (type_name, sent) in &outcome.sent_by_type {
            self.records_sent += *sent as u64;
            *self.sent_by_type.entry(type_name.clone()).or_insert(0) += *sent as u64;
        }

        for failure in &outcome.errors {
            *self
                .failures_by_bucket
                .entry(failure.bucket.clone())
                .or_insert(0) += 1;
        }

        self.records_stats.push(outcome.total as f64);
        self.batches_stats.push(outcome.batches_submitted as f64);
    }

    /// Produce a summary report
    pub fn summary(&self) -> RelaySummary {
        RelaySummary {
            total_invocations: self.total_invocations,
            failed_invocations: self.failed_invocations,
            total_failure_invocations: self.total_failure_invocations,
            total_records: self.total_records,
            records_sent: self.records_sent,
            records_deadlettered: self.records_deadlettered,
            records_failed: self.records_failed,
            oversize_batches: self.oversize_batches,
            failure_rate: if self.total_records > 0 {
                self.records_failed as f64 / self.total_records as f64 * 100.0
            } else {
                0.0
            },
            records_per_invocation: StatsSummary::from(&self.records_stats),
            batches_per_invocation: StatsSummary::from(&self.batches_stats),
            sent_by_type: self.sent_by_type.clone(),
            failures_by_bucket: self.failures_by_bucket.clone(),
        }
    }

    /// Reset all totals
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Summary report for one run
#[derive(Debug, Clone, Default)]
pub struct RelaySummary {
    pub total_invocations: u64,
    pub failed_invocations: u64,
    pub total_failure_invocations: u64,
    pub total_records: u64,
    pub records_sent: u64,
    pub records_deadlettered: u64,
    pub records_failed: u64,
    pub oversize_batches: u64,
    pub failure_rate: f64,
    pub records_per_invocation: StatsSummary,
    pub batches_per_invocation: StatsSummary,
    pub sent_by_type: HashMap<String, u64>,
    pub failures_by_bucket: HashMap<String, u64>,
}

impl std::fmt::Display for RelaySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Relay Summary ===")?;
        writeln!(
            f,
            "Invocations: {} ({} with failures, {} total failures)",
            self.total_invocations, self.failed_invocations, self.total_failure_invocations
        )?;
        writeln!(f, "Records: {}", self.total_records)?;
        writeln!(f, "  sent: {}", self.records_sent)?;
        writeln!(f, "  dead-lettered: {}", self.records_deadlettered)?;
        writeln!(
            f,
            "  failed: {} ({:.2}%)",
            self.records_failed, self.failure_rate
        )?;
        writeln!(f, "Oversize batches: {}", self.oversize_batches)?;
        writeln!(
            f,
            "Records per invocation: {}",
            self.records_per_invocation
        )?;
        writeln!(
            f,
            "Batches per invocation: {}",
            self.batches_per_invocation
        )?;

        if !self.sent_by_type.is_empty() {
            writeln!(f, "Sent by type:")?;
            let mut types: Vec<_> = self.sent_by_type.iter().collect();
            types.sort_by_key(|(name, _)| name.as_str());
            for (type_name, sent) in types {
                writeln!(f, "  {}: {}", type_name, sent)?;
            }
        }

        if !self.failures_by_bucket.is_empty() {
            writeln!(f, "Failures by bucket:")?;
            let mut buckets: Vec<_> = self.failures_by_bucket.iter().collect();
            buckets.sort_by_key(|(name, _)| name.as_str());
            for (bucket, count) in buckets {
                writeln!(f, "  {}: {}", bucket, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics calculator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}
