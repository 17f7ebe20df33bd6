//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Mock source -> coordinator -> transport flows
//! - Partial-failure and isolation behavior
//! - Cancellation at batch boundaries
//! - Replay file -> file transport round trips

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // Verify the contracts crate surface
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod support {
    use async_trait::async_trait;
    use contracts::{ChangeRecord, ContractError, DeadletterStore, RecordBatch, Transport};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Transport that records batches and can fail selected submissions.
    ///
    /// `fail_filter` receives (bucket tag of the first payload, per-tag
    /// submission index) and returns true to fail that submission.
    pub struct TestTransport {
        pub batches: Mutex<Vec<RecordBatch>>,
        pub fail_filter: Option<Box<dyn Fn(&str, usize) -> bool + Send + Sync>>,
        seen: Mutex<std::collections::HashMap<String, usize>>,
    }

    impl TestTransport {
        pub fn accepting() -> Self {
            Self {
                batches: Mutex::new(Vec::new()),
                fail_filter: None,
                seen: Mutex::new(std::collections::HashMap::new()),
            }
        }

        pub fn failing_when(
            filter: impl Fn(&str, usize) -> bool + Send + Sync + 'static,
        ) -> Self {
            Self {
                fail_filter: Some(Box::new(filter)),
                ..Self::accepting()
            }
        }

        pub fn submitted_records(&self) -> usize {
            self.batches.lock().unwrap().iter().map(RecordBatch::len).sum()
        }
    }

    #[async_trait]
    impl Transport for TestTransport {
        fn name(&self) -> &str {
            "test"
        }

        async fn submit(&self, batch: &RecordBatch) -> Result<(), ContractError> {
            let tag: String = serde_json::from_slice::<serde_json::Value>(&batch.payloads()[0])
                .ok()
                .and_then(|v| v["type"].as_str().map(str::to_string))
                .unwrap_or_default();

            let index = {
                let mut seen = self.seen.lock().unwrap();
                let entry = seen.entry(tag.clone()).or_insert(0);
                let index = *entry;
                *entry += 1;
                index
            };

            if let Some(ref filter) = self.fail_filter {
                if filter(&tag, index) {
                    return Err(ContractError::transport_submit("test", "induced failure"));
                }
            }

            self.batches.lock().unwrap().push(batch.clone());
            Ok(())
        }
    }

    /// Dead-letter store that records what it accepted
    pub struct TestDeadletter {
        pub fail: bool,
        pub accepted: Mutex<Vec<ChangeRecord>>,
        pub submissions: AtomicUsize,
    }

    impl TestDeadletter {
        pub fn accepting() -> Self {
            Self {
                fail: false,
                accepted: Mutex::new(Vec::new()),
                submissions: AtomicUsize::new(0),
            }
        }

        pub fn rejecting() -> Self {
            Self {
                fail: true,
                ..Self::accepting()
            }
        }
    }

    #[async_trait]
    impl DeadletterStore for TestDeadletter {
        fn name(&self) -> &str {
            "test_dlq"
        }

        async fn submit_unknown(&self, records: &[ChangeRecord]) -> Result<(), ContractError> {
            self.submissions.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ContractError::deadletter_submit("test_dlq", "induced"));
            }
            self.accepted.lock().unwrap().extend_from_slice(records);
            Ok(())
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use batcher::BatchAssembler;
    use classifier::Classifier;
    use contracts::{ChangeRecord, ChangeSource, Delivery, InvocationStatus};
    use dispatcher::DispatchCoordinator;
    use ingestion::{MockSource, MockSourceConfig};
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    use crate::support::{TestDeadletter, TestTransport};

    fn coordinator(
        transport: Arc<TestTransport>,
        deadletter: Arc<TestDeadletter>,
        max_batch_bytes: usize,
    ) -> DispatchCoordinator {
        DispatchCoordinator::new(
            Classifier::new("type", ["a".to_string(), "b".to_string()]),
            BatchAssembler::new(max_batch_bytes),
            transport,
            deadletter,
            Duration::from_millis(500),
        )
    }

    fn record(tag: &str, n: u64) -> ChangeRecord {
        ChangeRecord::from_payload(json!({"type": tag, "n": n}))
    }

    /// End-to-end: MockSource -> DispatchCoordinator -> TestTransport
    #[tokio::test]
    async fn test_e2e_mock_pipeline() {
        let transport = Arc::new(TestTransport::accepting());
        let deadletter = Arc::new(TestDeadletter::accepting());
        let coordinator = coordinator(transport.clone(), deadletter.clone(), 1 << 20);

        let mut source = MockSource::new(MockSourceConfig {
            kinds: vec!["a".to_string(), "b".to_string()],
            delivery_size: 40,
            total_records: 100,
            unknown_ratio: 0.1,
        });
        let cancel = CancellationToken::new();

        let mut total = 0usize;
        let mut success = 0usize;
        while let Some(delivery) = source.next_delivery().await.unwrap() {
            let outcome = coordinator.dispatch(delivery, &cancel).await;
            assert_eq!(outcome.status(), InvocationStatus::CompletedOk);
            total += outcome.total;
            success += outcome.success_count();
        }

        assert_eq!(total, 100);
        assert_eq!(success, 100);
        // 10% of the synthetic feed is unrecognizable
        assert_eq!(deadletter.accepted.lock().unwrap().len(), 10);
        assert_eq!(transport.submitted_records(), 90);
    }

    /// Mixed delivery: 2 known A + 1 known B + 2 unknown records
    #[tokio::test]
    async fn test_mixed_delivery_batches_and_deadletter() {
        let transport = Arc::new(TestTransport::accepting());
        let deadletter = Arc::new(TestDeadletter::accepting());
        let coordinator = coordinator(transport.clone(), deadletter.clone(), 1 << 20);

        let records = vec![
            record("a", 0),
            record("x", 1),
            record("b", 2),
            record("a", 3),
            record("y", 4),
        ];
        let outcome = coordinator
            .dispatch(Delivery::new(0, records), &CancellationToken::new())
            .await;

        assert_eq!(outcome.total, 5);
        assert_eq!(outcome.success_count(), 5);
        assert_eq!(outcome.failed, 0);
        // One batch per populated type
        assert_eq!(outcome.batches_submitted, 2);
        assert_eq!(outcome.sent_by_type["a"], 2);
        assert_eq!(outcome.sent_by_type["b"], 1);
        // One dead-letter submission carrying both unknown records
        assert_eq!(
            deadletter
                .submissions
                .load(std::sync::atomic::Ordering::SeqCst),
            1
        );
        assert_eq!(deadletter.accepted.lock().unwrap().len(), 2);
    }

    /// A's second batch fails; the first batch still counts, B and the
    /// dead-letter path are unaffected
    #[tokio::test]
    async fn test_partial_failure_second_batch() {
        let transport = Arc::new(TestTransport::failing_when(|tag, index| {
            tag == "a" && index == 1
        }));
        let deadletter = Arc::new(TestDeadletter::accepting());

        // Limit sized to two records per batch: 4 "a" records -> 2 batches
        let probe = record("a", 0);
        let one = batcher::encode_record(&probe).unwrap().len();
        let coordinator = coordinator(transport.clone(), deadletter.clone(), one * 2);

        let records = vec![
            record("a", 0),
            record("a", 1),
            record("a", 2),
            record("a", 3),
            record("b", 4),
            record("z", 5),
        ];
        let outcome = coordinator
            .dispatch(Delivery::new(0, records), &CancellationToken::new())
            .await;

        assert_eq!(outcome.total, 6);
        // First A batch (2 records) succeeded before the failure
        assert_eq!(outcome.sent_by_type["a"], 2);
        assert_eq!(outcome.sent_by_type["b"], 1);
        assert_eq!(outcome.deadlettered, 1);
        assert_eq!(outcome.failed, 2);
        assert_eq!(outcome.status(), InvocationStatus::CompletedWithFailures);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].bucket, "a");
        assert_eq!(outcome.errors[0].failed_records, 2);
        // Partition invariant
        assert_eq!(outcome.success_count() + outcome.failed, outcome.total);
    }

    /// A record larger than the bound is emitted as its own
    /// flagged batch, never dropped
    #[tokio::test]
    async fn test_oversize_record_still_delivered() {
        let transport = Arc::new(TestTransport::accepting());
        let deadletter = Arc::new(TestDeadletter::accepting());
        let coordinator = coordinator(transport.clone(), deadletter, 64);

        let big = ChangeRecord::from_payload(json!({
            "type": "a",
            "blob": "x".repeat(500),
        }));
        let records = vec![record("a", 0), big, record("a", 2)];
        let outcome = coordinator
            .dispatch(Delivery::new(0, records), &CancellationToken::new())
            .await;

        assert_eq!(outcome.success_count(), 3);
        assert_eq!(outcome.oversize_batches, 1);
        assert_eq!(transport.submitted_records(), 3);
    }

    /// Order within a type is preserved end-to-end across batch splits
    #[tokio::test]
    async fn test_order_preserved_end_to_end() {
        let transport = Arc::new(TestTransport::accepting());
        let deadletter = Arc::new(TestDeadletter::accepting());

        let probe = record("a", 0);
        let one = batcher::encode_record(&probe).unwrap().len();
        let coordinator = coordinator(transport.clone(), deadletter, one * 2);

        let records: Vec<ChangeRecord> = (0..7).map(|n| record("a", n)).collect();
        let outcome = coordinator
            .dispatch(Delivery::new(0, records), &CancellationToken::new())
            .await;
        assert_eq!(outcome.success_count(), 7);

        let ns: Vec<u64> = transport
            .batches
            .lock()
            .unwrap()
            .iter()
            .flat_map(|b| b.payloads().iter())
            .map(|p| {
                serde_json::from_slice::<serde_json::Value>(p).unwrap()["n"]
                    .as_u64()
                    .unwrap()
            })
            .collect();
        assert_eq!(ns, (0..7).collect::<Vec<u64>>());
    }

    /// A rejecting dead-letter store fails only the unknown records
    #[tokio::test]
    async fn test_deadletter_outage_is_isolated() {
        let transport = Arc::new(TestTransport::accepting());
        let deadletter = Arc::new(TestDeadletter::rejecting());
        let coordinator = coordinator(transport.clone(), deadletter, 1 << 20);

        let records = vec![record("a", 0), record("b", 1), record("q", 2)];
        let outcome = coordinator
            .dispatch(Delivery::new(0, records), &CancellationToken::new())
            .await;

        assert_eq!(outcome.sent_by_type["a"], 1);
        assert_eq!(outcome.sent_by_type["b"], 1);
        assert_eq!(outcome.deadlettered, 0);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.errors[0].bucket, "deadletter");
    }

    /// Cancellation before dispatch: every path reports cancelled partials
    #[tokio::test]
    async fn test_cancellation_reports_partial_counts() {
        let transport = Arc::new(TestTransport::accepting());
        let deadletter = Arc::new(TestDeadletter::accepting());
        let coordinator = coordinator(transport.clone(), deadletter, 1 << 20);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let records = vec![record("a", 0), record("q", 1)];
        let outcome = coordinator.dispatch(Delivery::new(0, records), &cancel).await;

        assert_eq!(outcome.success_count(), 0);
        assert_eq!(outcome.failed, 2);
        assert_eq!(transport.submitted_records(), 0);
        assert!(outcome
            .errors
            .iter()
            .all(|e| e.kind == contracts::FailureKind::Cancelled));
    }
}

#[cfg(test)]
mod replay_tests {
    use std::io::Write;
    use std::sync::Arc;
    use std::time::Duration;

    use batcher::BatchAssembler;
    use classifier::Classifier;
    use contracts::ChangeSource;
    use dispatcher::{DispatchCoordinator, FileTransport, LogDeadletter};
    use ingestion::ReplaySource;
    use tokio_util::sync::CancellationToken;

    /// Replay NDJSON feed -> coordinator -> file transport round trip
    #[tokio::test]
    async fn test_replay_to_file_transport() {
        let mut feed = tempfile::NamedTempFile::new().unwrap();
        for n in 0..6 {
            let tag = if n % 3 == 2 { "other" } else { "a" };
            writeln!(feed, r#"{{"type":"{tag}","n":{n}}}"#).unwrap();
        }
        feed.flush().unwrap();

        let out_dir = tempfile::tempdir().unwrap();
        let out_path = out_dir.path().join("batches.ndjson");

        let coordinator = DispatchCoordinator::new(
            Classifier::new("type", ["a".to_string()]),
            BatchAssembler::new(1 << 20),
            Arc::new(FileTransport::new("file_hub", &out_path).unwrap()),
            Arc::new(LogDeadletter::new("dlq")),
            Duration::from_millis(500),
        );

        let mut source = ReplaySource::new(feed.path(), 3, None).unwrap();
        let cancel = CancellationToken::new();

        let mut sent = 0usize;
        let mut deadlettered = 0usize;
        while let Some(delivery) = source.next_delivery().await.unwrap() {
            let outcome = coordinator.dispatch(delivery, &cancel).await;
            assert_eq!(outcome.failed, 0);
            sent += outcome.sent_by_type.get("a").copied().unwrap_or(0);
            deadlettered += outcome.deadlettered;
        }

        assert_eq!(sent, 4);
        assert_eq!(deadlettered, 2);

        // Two deliveries, one batch each
        let content = std::fs::read_to_string(&out_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["transport"], "file_hub");
        assert_eq!(first["record_count"], 2);
    }
}

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};

    const FULL_TOML: &str = r#"
[feed]
tag_field = "type"
known_types = ["device_metric", "device_event"]

[source]
kind = "mock"
delivery_size = 40
[source.params]
total_records = "200"
unknown_ratio = "0.1"

[transport]
name = "hub"
kind = "log"
max_batch_bytes = 8192
submit_timeout_ms = 500

[deadletter]
name = "dlq"
kind = "log"
"#;

    #[test]
    fn test_full_config_loads() {
        let bp = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.feed.known_types.len(), 2);
        assert_eq!(bp.source.delivery_size, 40);
    }

    #[test]
    fn test_config_drives_source_factory() {
        let bp = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        let source = ingestion::create_source(&bp.source, &bp.feed.known_types);
        assert!(source.is_ok());
    }
}
