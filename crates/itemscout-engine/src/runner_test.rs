use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use itemscout_core::{ExtractedRecord, PlatformHint, Target};
use itemscout_extract::{ExtractError, QualityPolicy, Strategy, StrategyCatalog, StrategyKind};
use tempfile::TempDir;

use super::*;
use crate::sink::NullSink;

fn records(n: usize) -> Vec<ExtractedRecord> {
    (0..n)
        .map(|i| ExtractedRecord {
            name: format!("Item {i}"),
            price: Some(1000.0),
            url: format!("https://mall.example.com/goods/{i}"),
            image_url: None,
        })
        .collect()
}

fn target(id: &str, hint: Option<PlatformHint>) -> Target {
    Target {
        id: id.to_owned(),
        display_name: id.to_owned(),
        url: format!("https://{id}.example.com"),
        platform_hint: hint,
    }
}

/// Strategy double that succeeds for the listed target ids and fails for
/// everything else.
struct SucceedsFor {
    kind: StrategyKind,
    target_ids: Vec<String>,
    record_count: usize,
    calls: Arc<AtomicUsize>,
}

impl SucceedsFor {
    fn new(kind: StrategyKind, ids: &[&str], n: usize) -> (Arc<dyn Strategy>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let strategy = Arc::new(Self {
            kind,
            target_ids: ids.iter().map(|&s| s.to_owned()).collect(),
            record_count: n,
            calls: Arc::clone(&calls),
        });
        (strategy, calls)
    }
}

#[async_trait]
impl Strategy for SucceedsFor {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    async fn execute(&self, target: &Target) -> Result<Vec<ExtractedRecord>, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.target_ids.iter().any(|id| id == &target.id) {
            Ok(records(self.record_count))
        } else {
            Err(ExtractError::Network {
                url: target.url.clone(),
                reason: "connection refused".to_owned(),
            })
        }
    }
}

/// Sink double that remembers every write.
#[derive(Clone, Default)]
struct CaptureSink {
    writes: Arc<StdMutex<Vec<(String, String, usize)>>>,
}

impl RecordSink for CaptureSink {
    fn write_records(
        &self,
        target: &Target,
        strategy_id: &str,
        records: &[ExtractedRecord],
    ) -> Result<(), EngineError> {
        self.writes.lock().unwrap().push((
            target.id.clone(),
            strategy_id.to_owned(),
            records.len(),
        ));
        Ok(())
    }
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn store_path(&self) -> std::path::PathBuf {
        self.dir.path().join("strategy-mappings.json")
    }

    fn progress_path(&self) -> std::path::PathBuf {
        self.dir.path().join("batch-progress.json")
    }

    fn runner(
        &self,
        strategies: Vec<Arc<dyn Strategy>>,
        sink: Box<dyn RecordSink>,
    ) -> Arc<BatchRunner> {
        let orchestrator = Orchestrator::new(
            StrategyCatalog::from_strategies(strategies),
            QualityPolicy::default(),
            50,
        );
        Arc::new(BatchRunner::new(
            orchestrator,
            MappingStore::load(self.store_path()).unwrap(),
            ProgressLog::load(self.progress_path()).unwrap(),
            sink,
            RunOptions {
                politeness_delay_ms: 0,
                ..RunOptions::default()
            },
        ))
    }
}

#[tokio::test]
async fn completed_targets_are_skipped_on_resume() {
    let fixture = Fixture::new();
    {
        let mut progress = ProgressLog::load(fixture.progress_path()).unwrap();
        progress.mark_completed("t1");
        progress.persist().unwrap();
    }

    let (strategy, calls) = SucceedsFor::new(StrategyKind::StaticFetch, &["t1", "t2"], 5);
    let runner = fixture.runner(vec![strategy], Box::new(NullSink));

    let summary = runner
        .run(vec![target("t1", None), target("t2", None)])
        .await
        .unwrap();

    // only t2 reached the strategy
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.total_targets, 2);
}

#[tokio::test]
async fn hinted_failure_falls_through_to_fallback() {
    let fixture = Fixture::new();
    // the hinted strategy always fails, the fallback delivers 4 records
    let (hinted, hinted_calls) = SucceedsFor::new(StrategyKind::RenderedFetch, &[], 0);
    let (fallback, _) = SucceedsFor::new(StrategyKind::GenericFallback, &["t1"], 4);

    let sink = CaptureSink::default();
    let runner = fixture.runner(vec![hinted, fallback], Box::new(sink.clone()));
    let summary = runner
        .run(vec![target("t1", Some(PlatformHint::RenderedCommerce))])
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.total_records, 4);
    assert_eq!(summary.strategy_usage.get("generic-fallback"), Some(&1));
    assert_eq!(hinted_calls.load(Ordering::SeqCst), 1);

    let writes = sink.writes.lock().unwrap();
    assert_eq!(writes.as_slice(), &[("t1".to_owned(), "generic-fallback".to_owned(), 4)]);
    drop(writes);

    // the mapping now names the fallback as best
    let store = MappingStore::load(fixture.store_path()).unwrap();
    let mapping = store.get("t1").unwrap();
    assert_eq!(mapping.best_strategy_id.as_deref(), Some("generic-fallback"));
    assert_eq!(mapping.best_record_count, 4);
    assert_eq!(mapping.attempts.len(), 2);
    assert!(!mapping.attempts[0].succeeded);
    assert!(mapping.attempts[1].succeeded);
}

#[tokio::test]
async fn failures_do_not_stop_the_batch() {
    let fixture = Fixture::new();
    let (strategy, _) = SucceedsFor::new(StrategyKind::StaticFetch, &["t2"], 6);
    let runner = fixture.runner(vec![strategy], Box::new(NullSink));

    let summary = runner
        .run(vec![target("t1", None), target("t2", None)])
        .await
        .unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failures[0].target_id, "t1");

    let progress = ProgressLog::load(fixture.progress_path()).unwrap();
    assert!(progress.is_completed("t2"));
    assert!(!progress.is_completed("t1"));
    assert_eq!(progress.failed_count(), 1);
}

#[tokio::test]
async fn known_strategy_is_reused_on_second_run() {
    let fixture = Fixture::new();

    let (s1, first_calls) = SucceedsFor::new(StrategyKind::StaticFetch, &["t1"], 5);
    {
        let runner = fixture.runner(vec![s1], Box::new(NullSink));
        runner.run(vec![target("t1", None)]).await.unwrap();
    }
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);

    // clear progress so the target is processed again
    std::fs::remove_file(fixture.progress_path()).unwrap();

    let (s2, second_calls) = SucceedsFor::new(StrategyKind::StaticFetch, &["t1"], 5);
    let (other, other_calls) = SucceedsFor::new(StrategyKind::PlatformTemplate, &["t1"], 70);
    let runner = fixture.runner(vec![s2, other], Box::new(NullSink));
    let summary = runner.run(vec![target("t1", None)]).await.unwrap();

    // the stored strategy ran alone; no rediscovery happened
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    assert_eq!(other_calls.load(Ordering::SeqCst), 0);
    assert_eq!(summary.strategy_usage.get("static-fetch"), Some(&1));
}

#[tokio::test]
async fn sink_receives_best_records() {
    let fixture = Fixture::new();
    let (strategy, _) = SucceedsFor::new(StrategyKind::StaticFetch, &["t1"], 7);

    let sink = CaptureSink::default();
    let runner = fixture.runner(vec![strategy], Box::new(sink.clone()));
    runner.run(vec![target("t1", None)]).await.unwrap();

    let writes = sink.writes.lock().unwrap();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].2, 7);
    drop(writes);

    // state survived the final checkpoint
    let store = MappingStore::load(fixture.store_path()).unwrap();
    assert_eq!(store.get("t1").unwrap().best_record_count, 7);
}

#[tokio::test]
async fn worker_pool_processes_every_target() {
    let fixture = Fixture::new();
    let (strategy, calls) = SucceedsFor::new(StrategyKind::StaticFetch, &["t1", "t2", "t3"], 5);

    let orchestrator = Orchestrator::new(
        StrategyCatalog::from_strategies(vec![strategy]),
        QualityPolicy::default(),
        50,
    );
    let runner = Arc::new(BatchRunner::new(
        orchestrator,
        MappingStore::load(fixture.store_path()).unwrap(),
        ProgressLog::load(fixture.progress_path()).unwrap(),
        Box::new(NullSink),
        RunOptions {
            concurrency: 2,
            politeness_delay_ms: 0,
            ..RunOptions::default()
        },
    ));

    let summary = runner
        .run(vec![target("t1", None), target("t2", None), target("t3", None)])
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(summary.succeeded, 3);

    let progress = ProgressLog::load(fixture.progress_path()).unwrap();
    assert_eq!(progress.completed_count(), 3);
}
