//! Pipeline orchestrator - coordinates all components.
//!
//! Wires the change source to the dispatch coordinator and drives
//! invocations until the feed is exhausted, a limit is reached, or the
//! run is cancelled.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{ChangeSource, InvocationStatus, RelayBlueprint};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The relay blueprint configuration
    pub blueprint: RelayBlueprint,

    /// Maximum number of invocations to process (None = unlimited)
    pub max_invocations: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Halt consumption after this many consecutive failing invocations
    pub halt_after_failures: Option<u32>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    ///
    /// Cancelling the token stops consumption and propagates to in-flight
    /// publisher tasks, which stop at their next batch boundary.
    pub async fn run(self, cancel: CancellationToken) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Build collaborators
        info!(
            transport = %blueprint.transport.name,
            deadletter = %blueprint.deadletter.name,
            "Building dispatch coordinator..."
        );
        let coordinator = dispatcher::create_coordinator(blueprint)
            .await
            .context("Failed to create dispatch coordinator")?;

        let mut source = ingestion::create_source(&blueprint.source, &blueprint.feed.known_types)
            .context("Failed to create change source")?;

        info!(
            source = %source.name(),
            known_types = ?blueprint.feed.known_types,
            max_batch_bytes = blueprint.transport.max_batch_bytes,
            "Pipeline running"
        );

        // Arm the timeout watchdog (cancels the shared token)
        if let Some(timeout) = self.config.timeout {
            let watchdog_cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(timeout) => {
                        warn!(timeout_secs = timeout.as_secs(), "Pipeline timed out");
                        watchdog_cancel.cancel();
                    }
                    _ = watchdog_cancel.cancelled() => {}
                }
            });
        }

        // Consumption loop: one delivery = one invocation
        let mut stats = PipelineStats::default();
        let mut failure_streak: u32 = 0;

        loop {
            let delivery = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Cancellation requested, stopping consumption");
                    break;
                }
                next = source.next_delivery() => {
                    match next.context("Change source failed")? {
                        Some(delivery) => delivery,
                        None => {
                            info!("Change source exhausted");
                            break;
                        }
                    }
                }
            };

            let outcome = coordinator.dispatch(delivery, &cancel).await;
            stats.update(&outcome);

            // Escalation policy: sustained failure halts consumption
            if outcome.status() == InvocationStatus::CompletedWithFailures {
                failure_streak += 1;
                if let Some(halt_after) = self.config.halt_after_failures {
                    if failure_streak >= halt_after {
                        error!(
                            streak = failure_streak,
                            "Halting consumption after sustained failures"
                        );
                        stats.halted = true;
                        break;
                    }
                }
            } else {
                failure_streak = 0;
            }

            if let Some(max) = self.config.max_invocations {
                if stats.invocations >= max {
                    info!(invocations = stats.invocations, "Reached max invocations limit");
                    break;
                }
            }
        }

        stats.duration = start_time.elapsed();

        info!(
            invocations = stats.invocations,
            records = stats.records,
            failed = stats.records_failed,
            duration_secs = stats.duration.as_secs_f64(),
            rate = format!("{:.1}", stats.records_per_sec()),
            "Pipeline finished"
        );

        Ok(stats)
    }
}
