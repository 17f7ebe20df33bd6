//! # Dispatcher
//!
//! Dispatch-and-batch-publish module.
//!
//! Responsible for:
//! - Classifying one delivery into per-type buckets
//! - Fan-out: one publisher task per populated bucket plus a dead-letter task
//! - Sequential, size-bounded batch submission per type
//! - Aggregating per-task results into one `DispatchOutcome`
//!
//! Failures are isolated per bucket: one type's transport error never
//! aborts sibling buckets or the dead-letter path.

pub mod coordinator;
pub mod deadletter;
pub mod error;
pub mod publisher;
pub mod transports;

pub use contracts::{DeadletterStore, DispatchOutcome, InvocationStatus, Transport};
pub use coordinator::{create_coordinator, DispatchCoordinator};
pub use deadletter::{create_deadletter, FileDeadletter, LogDeadletter};
pub use error::DispatcherError;
pub use publisher::{PublishReport, TypePublisher};
pub use transports::{create_transport, FileTransport, LogTransport, UdpTransport};
