//! RecordBatch - size-bounded group of serialized record payloads
//!
//! Append-only while open, immutable once sealed and handed to a transport.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One transport batch: ordered serialized payloads with a running size.
///
/// The size bound is injected by the caller on every `try_add`, so the
/// batch itself carries no configuration. A payload that alone exceeds the
/// bound is accepted into an otherwise-empty batch and flagged `oversize`
/// instead of being dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordBatch {
    payloads: Vec<Bytes>,
    encoded_bytes: usize,
    oversize: bool,
}

impl RecordBatch {
    /// Open a new empty batch.
    pub fn open() -> Self {
        Self::default()
    }

    /// Try to append a payload without exceeding `max_bytes`.
    ///
    /// Returns `false` when adding would overflow a non-empty batch; the
    /// caller seals this batch and opens a new one. An oversized payload
    /// offered to an empty batch is accepted and the batch marked oversize.
    pub fn try_add(&mut self, payload: Bytes, max_bytes: usize) -> bool {
        if self.payloads.is_empty() {
            self.oversize = payload.len() > max_bytes;
            self.encoded_bytes = payload.len();
            self.payloads.push(payload);
            return true;
        }

        if self.encoded_bytes + payload.len() > max_bytes {
            return false;
        }

        self.encoded_bytes += payload.len();
        self.payloads.push(payload);
        true
    }

    /// Number of payloads in the batch
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Total encoded size of all payloads in bytes
    pub fn encoded_bytes(&self) -> usize {
        self.encoded_bytes
    }

    /// Whether the single payload in this batch exceeds the size bound
    pub fn is_oversize(&self) -> bool {
        self.oversize
    }

    /// Payloads in insertion order
    pub fn payloads(&self) -> &[Bytes] {
        &self.payloads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(len: usize) -> Bytes {
        Bytes::from(vec![b'x'; len])
    }

    #[test]
    fn test_try_add_within_limit() {
        let mut batch = RecordBatch::open();
        assert!(batch.try_add(payload(50), 120));
        assert!(batch.try_add(payload(50), 120));
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.encoded_bytes(), 100);
        assert!(!batch.is_oversize());
    }

    #[test]
    fn test_try_add_refuses_overflow() {
        let mut batch = RecordBatch::open();
        assert!(batch.try_add(payload(100), 120));
        assert!(!batch.try_add(payload(30), 120));
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.encoded_bytes(), 100);
    }

    #[test]
    fn test_oversized_singleton_accepted_and_flagged() {
        let mut batch = RecordBatch::open();
        assert!(batch.try_add(payload(500), 120));
        assert!(batch.is_oversize());
        assert_eq!(batch.len(), 1);
        // A second payload never joins an oversize batch
        assert!(!batch.try_add(payload(1), 120));
    }

    #[test]
    fn test_exact_fit_accepted() {
        let mut batch = RecordBatch::open();
        assert!(batch.try_add(payload(60), 120));
        assert!(batch.try_add(payload(60), 120));
        assert_eq!(batch.encoded_bytes(), 120);
    }
}
