//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref source_path) = args.source_path {
        info!(path = %source_path.display(), "Overriding source path from CLI");
        blueprint.source.params.insert(
            "path".to_string(),
            source_path.display().to_string(),
        );
    }
    if let Some(max_batch_bytes) = args.max_batch_bytes {
        info!(max_batch_bytes, "Overriding max batch size from CLI");
        blueprint.transport.max_batch_bytes = max_batch_bytes;
    }

    info!(
        known_types = blueprint.feed.known_types.len(),
        source = ?blueprint.source.kind,
        transport = %blueprint.transport.name,
        deadletter = %blueprint.deadletter.name,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        blueprint,
        max_invocations: if args.max_invocations == 0 {
            None
        } else {
            Some(args.max_invocations)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
        halt_after_failures: if args.halt_after == 0 {
            None
        } else {
            Some(args.halt_after)
        },
    };

    // Create pipeline and shared cancellation token
    let pipeline = Pipeline::new(pipeline_config);
    let cancel = CancellationToken::new();

    // Setup graceful shutdown handler
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        warn!("Received shutdown signal, stopping pipeline...");
        signal_cancel.cancel();
    });

    info!("Starting pipeline...");

    let stats = pipeline
        .run(cancel)
        .await
        .context("Pipeline execution failed")?;

    info!(
        invocations = stats.invocations,
        records = stats.records,
        failed = stats.records_failed,
        duration_secs = stats.duration.as_secs_f64(),
        "Pipeline completed"
    );

    // Print detailed statistics
    stats.print_summary();

    if stats.halted {
        return Err(CliError::Halted {
            streak: args.halt_after,
        }
        .into());
    }

    info!("Change Relay finished");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::RelayBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Feed:");
    println!("  Tag field: {}", blueprint.feed.tag_field);
    println!("  Known types ({}):", blueprint.feed.known_types.len());
    for known_type in &blueprint.feed.known_types {
        println!("    - {known_type}");
    }

    println!("\nSource:");
    println!("  Kind: {:?}", blueprint.source.kind);
    println!("  Delivery size: {}", blueprint.source.delivery_size);

    println!("\nTransport:");
    println!(
        "  {} ({:?}) - max {} bytes/batch, {}ms submit timeout",
        blueprint.transport.name,
        blueprint.transport.kind,
        blueprint.transport.max_batch_bytes,
        blueprint.transport.submit_timeout_ms
    );

    println!("\nDead-letter:");
    println!(
        "  {} ({:?})",
        blueprint.deadletter.name, blueprint.deadletter.kind
    );

    println!();
}
