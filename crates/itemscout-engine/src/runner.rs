//! Resumable batch runner: walks the target list, reuses known strategies,
//! and checkpoints state so an interrupted batch can pick up where it
//! stopped.

use std::collections::VecDeque;
use std::sync::Arc;

use itemscout_core::Target;
use rand::Rng;
use tokio::sync::Mutex;

use crate::error::EngineError;
use crate::orchestrator::Orchestrator;
use crate::progress::ProgressLog;
use crate::sink::RecordSink;
use crate::store::MappingStore;
use crate::summary::RunSummary;

/// Random extra delay added to the politeness pause, in milliseconds.
const JITTER_MAX_MS: u64 = 1000;

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Number of concurrent workers. 1 keeps strictly sequential, polite
    /// behavior and is the default.
    pub concurrency: usize,
    /// Pause between targets per worker.
    pub politeness_delay_ms: u64,
    /// Persist store and progress after this many processed targets.
    pub checkpoint_every: usize,
    /// How many leaders the summary keeps.
    pub top_n: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            politeness_delay_ms: 2000,
            checkpoint_every: 5,
            top_n: 10,
        }
    }
}

struct RunState {
    summary: RunSummary,
    processed: usize,
}

pub struct BatchRunner {
    orchestrator: Orchestrator,
    store: Mutex<MappingStore>,
    progress: Mutex<ProgressLog>,
    sink: Box<dyn RecordSink>,
    options: RunOptions,
}

impl BatchRunner {
    #[must_use]
    pub fn new(
        orchestrator: Orchestrator,
        store: MappingStore,
        progress: ProgressLog,
        sink: Box<dyn RecordSink>,
        options: RunOptions,
    ) -> Self {
        Self {
            orchestrator,
            store: Mutex::new(store),
            progress: Mutex::new(progress),
            sink,
            options,
        }
    }

    /// Run the batch over `targets`. Targets already marked completed are
    /// skipped, so re-running after an interruption only touches the
    /// remainder.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures abort the run; extraction failures are
    /// recorded per target and the batch moves on.
    pub async fn run(self: Arc<Self>, targets: Vec<Target>) -> Result<RunSummary, EngineError> {
        let state = Arc::new(Mutex::new(RunState {
            summary: RunSummary {
                total_targets: targets.len(),
                ..RunSummary::default()
            },
            processed: 0,
        }));

        if self.options.concurrency <= 1 {
            self.run_sequential(&targets, &state).await?;
        } else {
            self.run_workers(targets, &state).await?;
        }

        self.checkpoint().await?;

        let mut state = state.lock().await;
        state.summary.finish(self.options.top_n);
        Ok(std::mem::take(&mut state.summary))
    }

    async fn run_sequential(
        &self,
        targets: &[Target],
        state: &Mutex<RunState>,
    ) -> Result<(), EngineError> {
        let mut remaining = targets.len();
        for target in targets {
            remaining -= 1;
            if self.skip_if_completed(target, state).await {
                continue;
            }
            self.process_target(target, state).await?;
            if remaining > 0 {
                self.politeness_pause().await;
            }
        }
        Ok(())
    }

    async fn run_workers(
        self: &Arc<Self>,
        targets: Vec<Target>,
        state: &Arc<Mutex<RunState>>,
    ) -> Result<(), EngineError> {
        let queue = Arc::new(Mutex::new(VecDeque::from(targets)));
        let mut handles = Vec::with_capacity(self.options.concurrency);

        for worker in 0..self.options.concurrency {
            let runner = Arc::clone(self);
            let queue = Arc::clone(&queue);
            let state = Arc::clone(state);
            handles.push(tokio::spawn(async move {
                loop {
                    let Some(target) = queue.lock().await.pop_front() else {
                        break;
                    };
                    if runner.skip_if_completed(&target, &state).await {
                        continue;
                    }
                    runner.process_target(&target, &state).await?;
                    if !queue.lock().await.is_empty() {
                        runner.politeness_pause().await;
                    }
                }
                tracing::debug!(worker, "worker drained queue");
                Ok::<(), EngineError>(())
            }));
        }

        for handle in handles {
            handle
                .await
                .map_err(|e| EngineError::Worker(e.to_string()))??;
        }
        Ok(())
    }

    async fn skip_if_completed(&self, target: &Target, state: &Mutex<RunState>) -> bool {
        if self.progress.lock().await.is_completed(&target.id) {
            tracing::debug!(target = %target.id, "already completed, skipping");
            state.lock().await.summary.record_skip();
            return true;
        }
        false
    }

    async fn process_target(
        &self,
        target: &Target,
        state: &Mutex<RunState>,
    ) -> Result<(), EngineError> {
        let known = self
            .store
            .lock()
            .await
            .best_strategy(&target.id)
            .map(str::to_owned);

        let run = match known {
            Some(known_id) => self.orchestrator.scrape_known(target, &known_id).await,
            None => self.orchestrator.discover(target).await,
        };

        self.store.lock().await.apply_run(&target.id, &run);

        match &run.best {
            Some(best) => {
                self.sink
                    .write_records(target, &best.strategy_id, &best.records)?;
                self.progress.lock().await.mark_completed(&target.id);
                tracing::info!(
                    target = %target.id,
                    strategy = %best.strategy_id,
                    records = best.records.len(),
                    "target completed"
                );
                state.lock().await.summary.record_success(
                    &target.id,
                    &best.strategy_id,
                    best.records.len(),
                );
            }
            None => {
                let reason = run.failure_reason();
                self.progress.lock().await.mark_failed(&target.id);
                tracing::warn!(target = %target.id, reason = %reason, "target failed");
                state
                    .lock()
                    .await
                    .summary
                    .record_failure(&target.id, reason);
            }
        }

        let processed = {
            let mut state = state.lock().await;
            state.processed += 1;
            state.processed
        };
        if self.options.checkpoint_every > 0 && processed % self.options.checkpoint_every == 0 {
            self.checkpoint().await?;
        }
        Ok(())
    }

    async fn checkpoint(&self) -> Result<(), EngineError> {
        self.store.lock().await.persist()?;
        self.progress.lock().await.persist()
    }

    async fn politeness_pause(&self) {
        let jitter = rand::rng().random_range(0..=JITTER_MAX_MS);
        let pause = std::time::Duration::from_millis(self.options.politeness_delay_ms + jitter);
        tokio::time::sleep(pause).await;
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
