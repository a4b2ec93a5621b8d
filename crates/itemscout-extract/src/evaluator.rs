//! Acceptance rules for an extracted record set.

use itemscout_core::ExtractedRecord;

/// Rejection reason for record sets below the minimum count.
pub const REASON_TOO_FEW: &str = "too few records";
/// Rejection reason for record sets dominated by incomplete records.
pub const REASON_TOO_INCOMPLETE: &str = "too many incomplete records";

/// Policy constants for acceptance. These are tunable thresholds, not fixed
/// law; the defaults match the values the system has been run with.
#[derive(Debug, Clone, Copy)]
pub struct QualityPolicy {
    pub min_records: usize,
    pub min_complete_ratio: f64,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self {
            min_records: 3,
            min_complete_ratio: 0.5,
        }
    }
}

/// Outcome of evaluating one record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub accepted: bool,
    pub reason: Option<&'static str>,
}

impl Verdict {
    const fn accept() -> Self {
        Self {
            accepted: true,
            reason: None,
        }
    }

    const fn reject(reason: &'static str) -> Self {
        Self {
            accepted: false,
            reason: Some(reason),
        }
    }
}

impl QualityPolicy {
    /// Pure acceptance check.
    ///
    /// Price presence is deliberately not enforced: many listing pages omit
    /// prices entirely, and a price-less but otherwise complete record set is
    /// still useful downstream.
    #[must_use]
    pub fn evaluate(&self, records: &[ExtractedRecord]) -> Verdict {
        if records.len() < self.min_records {
            return Verdict::reject(REASON_TOO_FEW);
        }

        let complete = records.iter().filter(|r| r.is_complete()).count();
        #[allow(clippy::cast_precision_loss)]
        let complete_ratio = complete as f64 / records.len() as f64;
        if complete_ratio < self.min_complete_ratio {
            return Verdict::reject(REASON_TOO_INCOMPLETE);
        }

        Verdict::accept()
    }
}
