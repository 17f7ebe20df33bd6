//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    feed: FeedInfo,
    source: SourceInfo,
    transport: TransportInfo,
    deadletter: DeadletterInfo,
}

#[derive(Serialize)]
struct FeedInfo {
    tag_field: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    known_types: Vec<String>,
    known_type_count: usize,
}

#[derive(Serialize)]
struct SourceInfo {
    kind: String,
    delivery_size: usize,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    params: std::collections::HashMap<String, String>,
}

#[derive(Serialize)]
struct TransportInfo {
    name: String,
    kind: String,
    max_batch_bytes: usize,
    submit_timeout_ms: u64,
}

#[derive(Serialize)]
struct DeadletterInfo {
    name: String,
    kind: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::RelayBlueprint, args: &InfoArgs) -> ConfigInfo {
    let known_types = if args.types {
        blueprint.feed.known_types.clone()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        feed: FeedInfo {
            tag_field: blueprint.feed.tag_field.clone(),
            known_types,
            known_type_count: blueprint.feed.known_types.len(),
        },
        source: SourceInfo {
            kind: format!("{:?}", blueprint.source.kind),
            delivery_size: blueprint.source.delivery_size,
            params: blueprint.source.params.clone(),
        },
        transport: TransportInfo {
            name: blueprint.transport.name.clone(),
            kind: format!("{:?}", blueprint.transport.kind),
            max_batch_bytes: blueprint.transport.max_batch_bytes,
            submit_timeout_ms: blueprint.transport.submit_timeout_ms,
        },
        deadletter: DeadletterInfo {
            name: blueprint.deadletter.name.clone(),
            kind: format!("{:?}", blueprint.deadletter.kind),
        },
    }
}

fn print_config_info(blueprint: &contracts::RelayBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Change Relay Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Feed info
    println!("📦 Feed");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Tag field: {}", blueprint.feed.tag_field);
    if args.types {
        println!(
            "   └─ Known types ({}):",
            blueprint.feed.known_types.len()
        );
        for (i, known_type) in blueprint.feed.known_types.iter().enumerate() {
            let is_last = i == blueprint.feed.known_types.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            println!("      {} {}", prefix, known_type);
        }
    } else {
        println!(
            "   └─ Known types: {}",
            blueprint.feed.known_types.len()
        );
    }

    // Source
    println!("\n📥 Source");
    println!("   ├─ Kind: {:?}", blueprint.source.kind);
    if let Some(path) = blueprint.source.params.get("path") {
        println!("   ├─ Path: {}", path);
    }
    println!("   └─ Delivery size: {}", blueprint.source.delivery_size);

    // Transport
    println!("\n📤 Transport");
    println!(
        "   ├─ {} ({:?})",
        blueprint.transport.name, blueprint.transport.kind
    );
    println!(
        "   ├─ Max batch size: {} bytes",
        blueprint.transport.max_batch_bytes
    );
    println!(
        "   └─ Submit timeout: {}ms",
        blueprint.transport.submit_timeout_ms
    );

    // Dead-letter
    println!("\n🗑  Dead-letter");
    println!(
        "   └─ {} ({:?})",
        blueprint.deadletter.name, blueprint.deadletter.kind
    );

    println!();
}
