//! Persistent record of which strategy works for which target, plus the
//! transient result of one orchestrated run.

use chrono::{DateTime, Utc};
use itemscout_core::ExtractedRecord;
use serde::{Deserialize, Serialize};

/// One strategy execution against one target, success or not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttemptRecord {
    pub target_id: String,
    pub strategy_id: String,
    pub timestamp_utc: DateTime<Utc>,
    pub succeeded: bool,
    pub record_count: usize,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

/// Everything the store remembers about one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mapping {
    pub target_id: String,
    /// Strategy that produced the best accepted result, if any ever has.
    pub best_strategy_id: Option<String>,
    pub last_success: Option<DateTime<Utc>>,
    pub best_record_count: usize,
    /// Fraction of all recorded attempts that succeeded.
    pub rolling_success_rate: f64,
    pub attempts: Vec<AttemptRecord>,
}

impl Mapping {
    #[must_use]
    pub fn new(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            best_strategy_id: None,
            last_success: None,
            best_record_count: 0,
            rolling_success_rate: 0.0,
            attempts: Vec::new(),
        }
    }
}

/// Best accepted result within a single run.
#[derive(Debug, Clone)]
pub struct BestResult {
    pub strategy_id: String,
    pub records: Vec<ExtractedRecord>,
}

/// Outcome of orchestrating one target once. Pure data; the store folds it
/// into the persistent mapping via `apply_run`.
#[derive(Debug, Clone, Default)]
pub struct TargetRun {
    pub attempts: Vec<AttemptRecord>,
    pub best: Option<BestResult>,
}

impl TargetRun {
    /// Reason shown for a target where no strategy produced an acceptable
    /// record set: the last attempt's failure, which by candidate ordering
    /// is the generic fallback's.
    #[must_use]
    pub fn failure_reason(&self) -> String {
        self.attempts
            .iter()
            .rev()
            .find_map(|a| a.failure_reason.clone())
            .unwrap_or_else(|| "no strategy produced an acceptable record set".to_owned())
    }
}
