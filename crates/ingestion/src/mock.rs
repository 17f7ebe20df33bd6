//! MockSource - deterministic synthetic change feed

use async_trait::async_trait;
use contracts::{ChangeRecord, ChangeSource, ContractError, Delivery};
use metrics::counter;
use serde_json::json;
use tracing::debug;

/// Configuration for the synthetic feed.
#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    /// Known kinds to cycle through
    pub kinds: Vec<String>,

    /// Records per delivery
    pub delivery_size: usize,

    /// Total records before the feed reports exhaustion
    pub total_records: u64,

    /// Fraction of records emitted with an unrecognizable tag, within [0, 1]
    pub unknown_ratio: f64,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            kinds: vec!["device_metric".to_string(), "device_event".to_string()],
            delivery_size: 100,
            total_records: 500,
            unknown_ratio: 0.0,
        }
    }
}

/// Generates a deterministic synthetic feed: same config, same records.
///
/// Records cycle through the configured kinds; every `1/unknown_ratio`-th
/// record carries a tag outside the known set (alternating between an
/// alien tag and a missing tag field to exercise both unknown shapes).
pub struct MockSource {
    config: MockSourceConfig,
    unknown_stride: Option<u64>,
    emitted: u64,
    sequence: u64,
}

impl MockSource {
    pub fn new(config: MockSourceConfig) -> Self {
        let unknown_stride = if config.unknown_ratio > 0.0 {
            Some((1.0 / config.unknown_ratio).round().max(1.0) as u64)
        } else {
            None
        };

        Self {
            config,
            unknown_stride,
            emitted: 0,
            sequence: 0,
        }
    }

    fn make_record(&self, n: u64) -> ChangeRecord {
        let is_unknown = self
            .unknown_stride
            .is_some_and(|stride| n % stride == stride - 1);

        let payload = if is_unknown {
            if n % 2 == 0 {
                // Alien tag outside the known set
                json!({"id": format!("rec-{n}"), "type": format!("mystery_{}", n % 3), "seq": n})
            } else {
                // No tag field at all
                json!({"id": format!("rec-{n}"), "seq": n})
            }
        } else {
            let kind = &self.config.kinds[(n as usize) % self.config.kinds.len()];
            json!({
                "id": format!("rec-{n}"),
                "type": kind,
                "seq": n,
                "value": (n % 97) as f64 / 10.0,
            })
        };

        ChangeRecord::from_payload(payload)
    }
}

#[async_trait]
impl ChangeSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn next_delivery(&mut self) -> Result<Option<Delivery>, ContractError> {
        if self.emitted >= self.config.total_records {
            debug!(deliveries = self.sequence, "mock feed exhausted");
            return Ok(None);
        }

        let remaining = self.config.total_records - self.emitted;
        let count = remaining.min(self.config.delivery_size as u64);

        let records: Vec<ChangeRecord> = (self.emitted..self.emitted + count)
            .map(|n| self.make_record(n))
            .collect();

        self.emitted += count;
        let delivery = Delivery::new(self.sequence, records);
        self.sequence += 1;

        counter!("relay_source_records_total").increment(count);
        counter!("relay_source_deliveries_total").increment(1);

        Ok(Some(delivery))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(total: u64, size: usize, ratio: f64) -> MockSourceConfig {
        MockSourceConfig {
            kinds: vec!["a".to_string(), "b".to_string()],
            delivery_size: size,
            total_records: total,
            unknown_ratio: ratio,
        }
    }

    #[tokio::test]
    async fn test_mock_delivers_total_records() {
        let mut source = MockSource::new(config(25, 10, 0.0));
        let mut total = 0;
        let mut deliveries = 0;
        while let Some(delivery) = source.next_delivery().await.unwrap() {
            total += delivery.len();
            deliveries += 1;
        }
        assert_eq!(total, 25);
        assert_eq!(deliveries, 3);
    }

    #[tokio::test]
    async fn test_mock_is_deterministic() {
        let mut first = MockSource::new(config(20, 20, 0.25));
        let mut second = MockSource::new(config(20, 20, 0.25));

        let a = first.next_delivery().await.unwrap().unwrap();
        let b = second.next_delivery().await.unwrap().unwrap();
        for (left, right) in a.records.iter().zip(b.records.iter()) {
            assert_eq!(left.payload, right.payload);
        }
    }

    #[tokio::test]
    async fn test_mock_unknown_ratio() {
        let mut source = MockSource::new(config(100, 100, 0.25));
        let delivery = source.next_delivery().await.unwrap().unwrap();

        let unknown = delivery
            .records
            .iter()
            .filter(|r| {
                r.tag_value("type")
                    .map_or(true, |t| t != "a" && t != "b")
            })
            .count();
        assert_eq!(unknown, 25);
    }

    #[tokio::test]
    async fn test_mock_known_records_cycle_kinds() {
        let mut source = MockSource::new(config(4, 10, 0.0));
        let delivery = source.next_delivery().await.unwrap().unwrap();
        let tags: Vec<&str> = delivery
            .records
            .iter()
            .map(|r| r.tag_value("type").unwrap())
            .collect();
        assert_eq!(tags, vec!["a", "b", "a", "b"]);
    }
}
