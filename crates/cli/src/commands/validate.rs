//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    tag_field: String,
    known_type_count: usize,
    source_kind: String,
    transport: String,
    deadletter: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    tag_field: blueprint.feed.tag_field.clone(),
                    known_type_count: blueprint.feed.known_types.len(),
                    source_kind: format!("{:?}", blueprint.source.kind),
                    transport: format!(
                        "{} ({:?})",
                        blueprint.transport.name, blueprint.transport.kind
                    ),
                    deadletter: format!(
                        "{} ({:?})",
                        blueprint.deadletter.name, blueprint.deadletter.kind
                    ),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &contracts::RelayBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    // Oversized batches cannot be split further; a tiny bound makes every
    // batch a flagged singleton
    if blueprint.transport.max_batch_bytes < 256 {
        warnings.push(format!(
            "transport.max_batch_bytes is very small ({}) - most records will become oversize singletons",
            blueprint.transport.max_batch_bytes
        ));
    }

    if blueprint.transport.submit_timeout_ms < 100 {
        warnings.push(format!(
            "transport.submit_timeout_ms is very small ({}ms) - submissions may time out spuriously",
            blueprint.transport.submit_timeout_ms
        ));
    }

    if blueprint.feed.known_types.len() == 1 {
        warnings.push(
            "only one known type configured - every other record will be dead-lettered"
                .to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Tag field: {}", summary.tag_field);
            println!("  Known types: {}", summary.known_type_count);
            println!("  Source: {}", summary.source_kind);
            println!("  Transport: {}", summary.transport);
            println!("  Dead-letter: {}", summary.deadletter);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
