//! ReplaySource - replays a recorded change feed from an NDJSON file

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use contracts::{ChangeRecord, ChangeSource, ContractError, Delivery};
use metrics::counter;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tracing::{debug, info, warn};

/// Replays change records from a file, one JSON object per line.
///
/// Lines are grouped into deliveries of `delivery_size` in file order.
/// Malformed lines are skipped with a warning; the feed itself decides
/// what is a record, this source only transports them.
pub struct ReplaySource {
    name: String,
    path: PathBuf,
    delivery_size: usize,
    pace: Option<Duration>,
    lines: Option<Lines<BufReader<File>>>,
    sequence: u64,
    skipped_lines: u64,
}

impl ReplaySource {
    /// Create a replay source over the given NDJSON file.
    ///
    /// The file is opened lazily on the first `next_delivery` call.
    pub fn new(
        path: impl AsRef<Path>,
        delivery_size: usize,
        pace_ms: Option<u64>,
    ) -> Result<Self, ContractError> {
        let path = path.as_ref().to_path_buf();
        let name = format!("replay:{}", path.display());

        Ok(Self {
            name,
            path,
            delivery_size,
            pace: pace_ms.map(Duration::from_millis),
            lines: None,
            sequence: 0,
            skipped_lines: 0,
        })
    }

    /// Lines skipped because they were not valid JSON
    pub fn skipped_lines(&self) -> u64 {
        self.skipped_lines
    }

    async fn open_reader(&mut self) -> Result<(), ContractError> {
        let file = File::open(&self.path).await.map_err(|e| {
            ContractError::source_read(&self.name, format!("open failed: {e}"))
        })?;
        info!(path = %self.path.display(), "replay source opened");
        self.lines = Some(BufReader::new(file).lines());
        Ok(())
    }

    async fn read_delivery(&mut self) -> Result<Vec<ChangeRecord>, ContractError> {
        let lines = self.lines.as_mut().expect("reader opened");
        let mut records = Vec::with_capacity(self.delivery_size);

        while records.len() < self.delivery_size {
            let line = lines
                .next_line()
                .await
                .map_err(|e| ContractError::source_read(&self.name, e.to_string()))?;

            let Some(line) = line else {
                break; // EOF
            };
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(payload) => records.push(ChangeRecord::from_payload(payload)),
                Err(e) => {
                    self.skipped_lines += 1;
                    counter!("relay_source_lines_skipped_total").increment(1);
                    warn!(error = %e, "skipping malformed replay line");
                }
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl ChangeSource for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_delivery(&mut self) -> Result<Option<Delivery>, ContractError> {
        if self.lines.is_none() {
            self.open_reader().await?;
        }

        if let Some(pace) = self.pace {
            if self.sequence > 0 {
                tokio::time::sleep(pace).await;
            }
        }

        let records = self.read_delivery().await?;
        if records.is_empty() {
            debug!(deliveries = self.sequence, "replay feed exhausted");
            return Ok(None);
        }

        let delivery = Delivery::new(self.sequence, records);
        self.sequence += 1;

        counter!("relay_source_records_total").increment(delivery.len() as u64);
        counter!("relay_source_deliveries_total").increment(1);

        Ok(Some(delivery))
    }
}
