//! # Classifier
//!
//! Record classification module.
//!
//! Responsibilities:
//! - Assign each `ChangeRecord` to exactly one known logical type or `Unknown`
//! - Partition a delivery into order-preserving per-type buckets
//!
//! Classification is total: unrecognized data is data, not an error, until
//! the dead-letter step.

mod buckets;
mod classifier;

pub use buckets::TypeBuckets;
pub use classifier::Classifier;
