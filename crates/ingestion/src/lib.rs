//! # Ingestion
//!
//! Change source implementations feeding dispatch invocations.
//!
//! Responsibilities:
//! - Replay recorded change feeds from NDJSON files
//! - Generate deterministic synthetic feeds for testing and demos
//! - Group records into bounded deliveries (one delivery = one invocation)
//!
//! The real upstream feed (lease management, checkpointing, redelivery)
//! lives outside this workspace; these sources stand in for it behind the
//! same `ChangeSource` seam.
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::create_source;
//!
//! let mut source = create_source(&blueprint.source, &blueprint.feed.known_types)?;
//! while let Some(delivery) = source.next_delivery().await? {
//!     // dispatch the delivery
//! }
//! ```

mod mock;
mod replay;

pub use contracts::{ChangeSource, Delivery};
pub use mock::{MockSource, MockSourceConfig};
pub use replay::ReplaySource;

use contracts::{ContractError, SourceConfig, SourceKind};

/// Build a change source from configuration.
pub fn create_source(
    config: &SourceConfig,
    known_types: &[String],
) -> Result<Box<dyn ChangeSource>, ContractError> {
    match config.kind {
        SourceKind::Replay => {
            let path = config.params.get("path").ok_or_else(|| {
                ContractError::config_validation("source.params.path", "missing replay path")
            })?;
            let pace_ms = parse_param(config, "pace_ms")?;
            let source = ReplaySource::new(path, config.delivery_size, pace_ms)?;
            Ok(Box::new(source))
        }
        SourceKind::Mock => {
            let mock_config = MockSourceConfig {
                kinds: known_types.to_vec(),
                delivery_size: config.delivery_size,
                total_records: parse_param(config, "total_records")?.unwrap_or(500),
                unknown_ratio: parse_param(config, "unknown_ratio")?.unwrap_or(0.0),
            };
            Ok(Box::new(MockSource::new(mock_config)))
        }
    }
}

/// Parse an optional numeric source parameter.
fn parse_param<T: std::str::FromStr>(
    config: &SourceConfig,
    key: &str,
) -> Result<Option<T>, ContractError> {
    config
        .params
        .get(key)
        .map(|raw| {
            raw.parse().map_err(|_| {
                ContractError::config_validation(
                    format!("source.params.{key}"),
                    format!("invalid value '{raw}'"),
                )
            })
        })
        .transpose()
}
