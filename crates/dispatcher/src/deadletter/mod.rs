//! Concrete dead-letter store implementations and factory

mod file;
mod log;

pub use file::FileDeadletter;
pub use log::LogDeadletter;

use std::sync::Arc;

use contracts::{DeadletterConfig, DeadletterKind, DeadletterStore};
use tracing::instrument;

use crate::error::DispatcherError;

/// Create a dead-letter store from configuration
#[instrument(
    name = "deadletter_create",
    skip(config),
    fields(store = %config.name, kind = ?config.kind)
)]
pub fn create_deadletter(
    config: &DeadletterConfig,
) -> Result<Arc<dyn DeadletterStore>, DispatcherError> {
    match config.kind {
        DeadletterKind::Log => Ok(Arc::new(LogDeadletter::new(&config.name))),
        DeadletterKind::File => {
            let store = FileDeadletter::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::deadletter_creation(&config.name, e.to_string()))?;
            Ok(Arc::new(store))
        }
    }
}
