//! # Batcher
//!
//! Batch assembly module.
//!
//! Responsibilities:
//! - Serialize records in input order
//! - Split into batches honoring the transport size bound
//! - Emit oversized singletons flagged instead of dropping them
//!
//! Assembly is deterministic: the same records and limit always produce
//! byte-identical batches.

mod assembler;

pub use assembler::{encode_record, BatchAssembler};
pub use contracts::RecordBatch;
