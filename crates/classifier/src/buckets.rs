//! TypeBuckets - order-preserving partition of one delivery

use std::collections::HashMap;

use contracts::{ChangeRecord, TypeTag};
use tracing::debug;

use crate::Classifier;

/// Per-type buckets for one invocation, built once and consumed once.
///
/// Records keep their relative input order within each bucket; no ordering
/// is defined across buckets.
#[derive(Debug, Default)]
pub struct TypeBuckets {
    known: HashMap<String, Vec<ChangeRecord>>,
    unknown: Vec<ChangeRecord>,
    total: usize,
}

impl TypeBuckets {
    /// Classify every record of a delivery into buckets.
    pub fn partition(classifier: &Classifier, records: Vec<ChangeRecord>) -> Self {
        let mut buckets = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            match classifier.classify(&record) {
                TypeTag::Known(name) => {
                    buckets.known.entry(name).or_default().push(record);
                }
                TypeTag::Unknown => {
                    debug!(
                        record_id = record.id.as_deref().unwrap_or("<none>"),
                        "record matched no known type"
                    );
                    buckets.unknown.push(record);
                }
            }
        }

        buckets
    }

    /// Total records partitioned
    pub fn total(&self) -> usize {
        self.total
    }

    /// Records per known type (insertion order within each bucket)
    pub fn known(&self) -> &HashMap<String, Vec<ChangeRecord>> {
        &self.known
    }

    /// Unrecognized records, in input order
    pub fn unknown(&self) -> &[ChangeRecord] {
        &self.unknown
    }

    pub fn unknown_count(&self) -> usize {
        self.unknown.len()
    }

    /// Per-type record counts (for the invocation span)
    pub fn known_counts(&self) -> HashMap<String, usize> {
        self.known
            .iter()
            .map(|(name, records)| (name.clone(), records.len()))
            .collect()
    }

    /// Consume the buckets for dispatch.
    pub fn into_parts(self) -> (HashMap<String, Vec<ChangeRecord>>, Vec<ChangeRecord>) {
        (self.known, self.unknown)
    }
}
