//! Pipeline statistics and metrics.

use std::time::Duration;

use contracts::DispatchOutcome;
use observability::RelayStatsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Invocations processed
    pub invocations: u64,

    /// Total records across all invocations
    pub records: u64,

    /// Records acknowledged by the transport
    pub records_sent: u64,

    /// Records accepted by the dead-letter store
    pub records_deadlettered: u64,

    /// Records neither delivered nor dead-lettered
    pub records_failed: u64,

    /// Whether consumption was halted after sustained failures
    pub halted: bool,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Detailed aggregation for the summary report
    pub relay_stats: RelayStatsAggregator,
}

impl PipelineStats {
    /// Fold one invocation outcome into the run statistics
    pub fn update(&mut self, outcome: &DispatchOutcome) {
        self.invocations += 1;
        self.records += outcome.total as u64;
        self.records_sent += outcome.sent_by_type.values().sum::<usize>() as u64;
        self.records_deadlettered += outcome.deadlettered as u64;
        self.records_failed += outcome.failed as u64;
        self.relay_stats.update(outcome);
    }

    /// Records processed per second over the whole run
    pub fn records_per_sec(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.records as f64 / secs
        } else {
            0.0
        }
    }

    /// Print the detailed summary report to stdout
    pub fn print_summary(&self) {
        println!();
        println!("{}", self.relay_stats.summary());
        println!(
            "Duration: {:.2}s ({:.1} records/s)",
            self.duration.as_secs_f64(),
            self.records_per_sec()
        );
        if self.halted {
            println!("Consumption HALTED after sustained failures");
        }
    }
}
