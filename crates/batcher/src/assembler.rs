//! BatchAssembler - splits one type bucket into transport-sized batches

use bytes::Bytes;
use contracts::{ChangeRecord, ContractError, RecordBatch};
use tracing::warn;

/// Serialize one record payload for the wire.
pub fn encode_record(record: &ChangeRecord) -> Result<Bytes, ContractError> {
    serde_json::to_vec(&record.payload)
        .map(Bytes::from)
        .map_err(|e| {
            ContractError::payload_encode(
                record.id.as_deref().unwrap_or("<none>"),
                e.to_string(),
            )
        })
}

/// Assembles ordered batches under a fixed size bound.
///
/// Batches form a total partition of the input: concatenating the payloads
/// of all emitted batches reconstructs the original record order.
#[derive(Debug, Clone, Copy)]
pub struct BatchAssembler {
    max_batch_bytes: usize,
}

impl BatchAssembler {
    pub fn new(max_batch_bytes: usize) -> Self {
        Self { max_batch_bytes }
    }

    /// Configured size bound in bytes
    pub fn max_batch_bytes(&self) -> usize {
        self.max_batch_bytes
    }

    /// Assemble records into one or more sealed batches.
    ///
    /// A record that would overflow the open batch seals it and starts a
    /// new one. A record whose own encoding exceeds the bound becomes its
    /// own flagged batch; it is never silently dropped.
    pub fn assemble(&self, records: &[ChangeRecord]) -> Result<Vec<RecordBatch>, ContractError> {
        let mut batches = Vec::new();
        let mut open = RecordBatch::open();

        for record in records {
            let payload = encode_record(record)?;

            if payload.len() > self.max_batch_bytes {
                warn!(
                    record_id = record.id.as_deref().unwrap_or("<none>"),
                    encoded_bytes = payload.len(),
                    max_batch_bytes = self.max_batch_bytes,
                    "record exceeds batch size bound, emitting oversize singleton"
                );
            }

            if !open.try_add(payload.clone(), self.max_batch_bytes) {
                batches.push(std::mem::replace(&mut open, RecordBatch::open()));
                // An empty batch always accepts the payload
                open.try_add(payload, self.max_batch_bytes);
            }
        }

        if !open.is_empty() {
            batches.push(open);
        }

        Ok(batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_with_pad(n: usize) -> ChangeRecord {
        ChangeRecord::from_payload(json!({"type": "a", "pad": "x".repeat(n)}))
    }

    fn encoded_len(record: &ChangeRecord) -> usize {
        encode_record(record).unwrap().len()
    }

    #[test]
    fn test_three_records_two_batches() {
        // Three equally-sized records, limit fits exactly two
        let records: Vec<_> = (0..3).map(|_| record_with_pad(20)).collect();
        let size = encoded_len(&records[0]);
        let assembler = BatchAssembler::new(size * 2);

        let batches = assembler.assemble(&records).unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[1].len(), 1);
        assert_eq!(batches[0].encoded_bytes(), size * 2);
        assert!(!batches[0].is_oversize());
    }

    #[test]
    fn test_single_batch_when_under_limit() {
        let records: Vec<_> = (0..5).map(|_| record_with_pad(4)).collect();
        let assembler = BatchAssembler::new(1024);

        let batches = assembler.assemble(&records).unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 5);
    }

    #[test]
    fn test_oversized_singleton_emitted() {
        let small = record_with_pad(4);
        let huge = record_with_pad(4096);
        let size = encoded_len(&small);
        let assembler = BatchAssembler::new(size * 2);

        let batches = assembler
            .assemble(&[small.clone(), huge, small])
            .unwrap();
        assert_eq!(batches.len(), 3);
        assert!(!batches[0].is_oversize());
        assert!(batches[1].is_oversize());
        assert_eq!(batches[1].len(), 1);
        assert!(!batches[2].is_oversize());
    }

    #[test]
    fn test_order_preserved_across_batches() {
        let records: Vec<_> = (0..7)
            .map(|n| ChangeRecord::from_payload(json!({"type": "a", "n": n, "pad": "xxxx"})))
            .collect();
        let size = encoded_len(&records[0]);
        let assembler = BatchAssembler::new(size * 3);

        let batches = assembler.assemble(&records).unwrap();
        let flattened: Vec<u64> = batches
            .iter()
            .flat_map(|b| b.payloads())
            .map(|p| {
                serde_json::from_slice::<serde_json::Value>(p).unwrap()["n"]
                    .as_u64()
                    .unwrap()
            })
            .collect();
        assert_eq!(flattened, (0..7).collect::<Vec<u64>>());
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let records: Vec<_> = (0..10).map(|_| record_with_pad(13)).collect();
        let assembler = BatchAssembler::new(encoded_len(&records[0]) * 4 + 1);

        let first = assembler.assemble(&records).unwrap();
        let second = assembler.assemble(&records).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input() {
        let assembler = BatchAssembler::new(1024);
        let batches = assembler.assemble(&[]).unwrap();
        assert!(batches.is_empty());
    }
}
