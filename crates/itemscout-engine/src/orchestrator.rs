//! Per-target discovery: try candidate strategies in order, judge each
//! result, and keep the best accepted one.

use std::time::Instant;

use chrono::Utc;
use itemscout_core::{ExtractedRecord, Target};
use itemscout_extract::{QualityPolicy, Strategy, StrategyCatalog, StrategyKind};

use crate::mapping::{AttemptRecord, BestResult, TargetRun};

pub struct Orchestrator {
    catalog: StrategyCatalog,
    policy: QualityPolicy,
    /// Record count past which the current best is good enough and the
    /// remaining candidates are skipped.
    saturation_threshold: usize,
}

impl Orchestrator {
    #[must_use]
    pub fn new(catalog: StrategyCatalog, policy: QualityPolicy, saturation_threshold: usize) -> Self {
        Self {
            catalog,
            policy,
            saturation_threshold,
        }
    }

    /// Try every candidate strategy for a target with no known mapping.
    ///
    /// Each candidate runs to completion and is judged; the best accepted
    /// result by record count wins, first-tried on ties. A result past the
    /// saturation threshold short-circuits the rest.
    pub async fn discover(&self, target: &Target) -> TargetRun {
        self.discover_skipping(target, None).await
    }

    /// Re-scrape a target whose mapping already names a strategy. The known
    /// strategy runs alone; only when it fails or is rejected does full
    /// discovery run over the remaining candidates.
    pub async fn scrape_known(&self, target: &Target, known_id: &str) -> TargetRun {
        let Some(strategy) = self.catalog.by_id(known_id) else {
            tracing::warn!(target = %target.id, known_id, "unknown strategy id in mapping, rediscovering");
            return self.discover(target).await;
        };

        let (attempt, records) = self.attempt(strategy.as_ref(), target).await;
        if let Some(records) = records {
            let strategy_id = attempt.strategy_id.clone();
            return TargetRun {
                attempts: vec![attempt],
                best: Some(BestResult {
                    strategy_id,
                    records,
                }),
            };
        }

        tracing::info!(
            target = %target.id,
            known_id,
            reason = attempt.failure_reason.as_deref().unwrap_or("unknown"),
            "known strategy no longer works, rediscovering"
        );
        let mut run = self.discover_skipping(target, Some(strategy.kind())).await;
        run.attempts.insert(0, attempt);
        run
    }

    async fn discover_skipping(&self, target: &Target, skip: Option<StrategyKind>) -> TargetRun {
        let mut run = TargetRun::default();

        for strategy in self.catalog.candidates_for(target) {
            if Some(strategy.kind()) == skip {
                continue;
            }

            let (attempt, records) = self.attempt(strategy.as_ref(), target).await;
            let strategy_id = attempt.strategy_id.clone();
            run.attempts.push(attempt);

            if let Some(records) = records {
                let count = records.len();
                let improves = run.best.as_ref().is_none_or(|b| count > b.records.len());
                if improves {
                    run.best = Some(BestResult {
                        strategy_id,
                        records,
                    });
                }
                if count > self.saturation_threshold {
                    tracing::debug!(target = %target.id, count, "saturated, skipping remaining candidates");
                    break;
                }
            }
        }

        run
    }

    /// Run one strategy and judge the result. Returns the attempt record
    /// and, when the record set was accepted, the records themselves.
    async fn attempt(
        &self,
        strategy: &dyn Strategy,
        target: &Target,
    ) -> (AttemptRecord, Option<Vec<ExtractedRecord>>) {
        let strategy_id = strategy.kind().id().to_owned();
        let started = Instant::now();
        let outcome = strategy.execute(target).await;
        let execution_time_ms =
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let mut attempt = AttemptRecord {
            target_id: target.id.clone(),
            strategy_id,
            timestamp_utc: Utc::now(),
            succeeded: false,
            record_count: 0,
            execution_time_ms,
            failure_reason: None,
        };

        match outcome {
            Ok(records) => {
                attempt.record_count = records.len();
                let verdict = self.policy.evaluate(&records);
                if verdict.accepted {
                    attempt.succeeded = true;
                    (attempt, Some(records))
                } else {
                    attempt.failure_reason = verdict.reason.map(str::to_owned);
                    (attempt, None)
                }
            }
            Err(e) => {
                attempt.failure_reason = Some(e.to_string());
                (attempt, None)
            }
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
