//! End-of-batch rollup.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TargetTally {
    pub target_id: String,
    pub record_count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FailureLine {
    pub target_id: String,
    pub reason: String,
}

#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub total_targets: usize,
    pub skipped: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_records: usize,
    /// How many targets each strategy ended up serving.
    pub strategy_usage: BTreeMap<String, usize>,
    pub top_targets: Vec<TargetTally>,
    pub failures: Vec<FailureLine>,
}

impl RunSummary {
    pub(crate) fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub(crate) fn record_success(&mut self, target_id: &str, strategy_id: &str, count: usize) {
        self.succeeded += 1;
        self.total_records += count;
        *self
            .strategy_usage
            .entry(strategy_id.to_owned())
            .or_insert(0) += 1;
        self.top_targets.push(TargetTally {
            target_id: target_id.to_owned(),
            record_count: count,
        });
    }

    pub(crate) fn record_failure(&mut self, target_id: &str, reason: String) {
        self.failed += 1;
        self.failures.push(FailureLine {
            target_id: target_id.to_owned(),
            reason,
        });
    }

    /// Sort leaders and keep the top `n`. Called once, at the end of a run.
    pub(crate) fn finish(&mut self, top_n: usize) {
        self.top_targets
            .sort_by(|a, b| b.record_count.cmp(&a.record_count));
        self.top_targets.truncate(top_n);
        self.failures.sort_by(|a, b| a.target_id.cmp(&b.target_id));
    }

    /// Human-readable report for the terminal.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "batch complete");
        let _ = writeln!(
            out,
            "  targets: {} total, {} succeeded, {} failed, {} skipped",
            self.total_targets, self.succeeded, self.failed, self.skipped
        );
        let _ = writeln!(out, "  records: {}", self.total_records);

        if !self.strategy_usage.is_empty() {
            let _ = writeln!(out, "  strategy usage:");
            for (strategy_id, count) in &self.strategy_usage {
                let _ = writeln!(out, "    {strategy_id}: {count}");
            }
        }
        if !self.top_targets.is_empty() {
            let _ = writeln!(out, "  top targets:");
            for tally in &self.top_targets {
                let _ = writeln!(out, "    {}: {} records", tally.target_id, tally.record_count);
            }
        }
        if !self.failures.is_empty() {
            let _ = writeln!(out, "  failures:");
            for failure in &self.failures {
                let _ = writeln!(out, "    {}: {}", failure.target_id, failure.reason);
            }
        }
        out
    }
}
