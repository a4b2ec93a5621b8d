//! Destinations for accepted record sets.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use itemscout_core::{ExtractedRecord, Target};
use serde::Serialize;

use crate::error::EngineError;

/// Where accepted record sets go. The runner writes each target's records
/// once, after its best strategy is settled.
pub trait RecordSink: Send + Sync {
    /// # Errors
    ///
    /// Sink failures are infrastructure failures and abort the batch.
    fn write_records(
        &self,
        target: &Target,
        strategy_id: &str,
        records: &[ExtractedRecord],
    ) -> Result<(), EngineError>;
}

/// Envelope written for each target.
#[derive(Serialize)]
struct RecordFile<'a> {
    target_id: &'a str,
    target_name: &'a str,
    source_url: &'a str,
    strategy_id: &'a str,
    extracted_at: DateTime<Utc>,
    record_count: usize,
    records: &'a [ExtractedRecord],
}

/// One pretty-printed JSON file per target under a directory.
pub struct JsonDirSink {
    dir: PathBuf,
}

impl JsonDirSink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RecordSink for JsonDirSink {
    fn write_records(
        &self,
        target: &Target,
        strategy_id: &str,
        records: &[ExtractedRecord],
    ) -> Result<(), EngineError> {
        fs::create_dir_all(&self.dir).map_err(|e| EngineError::io(&self.dir, e))?;

        let path = self.dir.join(format!("{}.json", target.id));
        let file = RecordFile {
            target_id: &target.id,
            target_name: &target.display_name,
            source_url: &target.url,
            strategy_id,
            extracted_at: Utc::now(),
            record_count: records.len(),
            records,
        };
        let raw = serde_json::to_vec_pretty(&file).map_err(|source| EngineError::Serialize {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, raw).map_err(|e| EngineError::io(&path, e))
    }
}

/// Discards records. Used when only the mapping outcome matters.
pub struct NullSink;

impl RecordSink for NullSink {
    fn write_records(
        &self,
        _target: &Target,
        _strategy_id: &str,
        _records: &[ExtractedRecord],
    ) -> Result<(), EngineError> {
        Ok(())
    }
}
