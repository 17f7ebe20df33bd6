//! DeadletterStore trait - out-of-band storage for unrecognized records

use async_trait::async_trait;

use crate::{ChangeRecord, ContractError};

/// Dead-letter store for records that matched no known logical type.
///
/// Records are forwarded verbatim; this core never retries a rejected
/// submission.
#[async_trait]
pub trait DeadletterStore: Send + Sync {
    /// Store name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Persist unrecognized records out-of-band
    async fn submit_unknown(&self, records: &[ChangeRecord]) -> Result<(), ContractError>;
}
