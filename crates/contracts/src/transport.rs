//! Transport trait - downstream publish interface
//!
//! Defines the abstract interface for transport clients.

use async_trait::async_trait;

use crate::{ContractError, RecordBatch};

/// Downstream transport client.
///
/// Implementations must be safe for concurrent use: one shared handle is
/// used by every type-publisher task within an invocation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Submit one sealed batch and await acknowledgement
    ///
    /// # Errors
    /// Returns submit error (should include context)
    async fn submit(&self, batch: &RecordBatch) -> Result<(), ContractError>;
}
