//! ChangeSource trait - upstream delivery abstraction
//!
//! The upstream feed owns polling cadence, leases, and checkpointing; this
//! core only consumes bounded deliveries one invocation at a time.

use async_trait::async_trait;

use crate::{ContractError, Delivery};

/// Upstream change source.
///
/// `next_delivery` hands over one bounded ordered collection of records.
/// The core never re-requests a delivery; redelivery after a failed
/// invocation is the source's policy, not this crate's.
#[async_trait]
pub trait ChangeSource: Send {
    /// Source name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Produce the next delivery, or `None` when the feed is exhausted
    async fn next_delivery(&mut self) -> Result<Option<Delivery>, ContractError>;
}
