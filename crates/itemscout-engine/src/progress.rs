//! Batch progress log. Lets an interrupted run resume without re-scraping
//! targets that already completed.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::store::write_json_atomic;

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProgressState {
    completed: BTreeSet<String>,
    failed: BTreeSet<String>,
}

pub struct ProgressLog {
    path: PathBuf,
    state: ProgressState,
}

impl ProgressLog {
    /// Missing file means a fresh batch.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| EngineError::Serialize {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ProgressState::default(),
            Err(e) => return Err(EngineError::io(&path, e)),
        };
        Ok(Self { path, state })
    }

    #[must_use]
    pub fn is_completed(&self, target_id: &str) -> bool {
        self.state.completed.contains(target_id)
    }

    /// Completion supersedes any earlier failure of the same target.
    pub fn mark_completed(&mut self, target_id: &str) {
        self.state.failed.remove(target_id);
        self.state.completed.insert(target_id.to_owned());
    }

    pub fn mark_failed(&mut self, target_id: &str) {
        if !self.state.completed.contains(target_id) {
            self.state.failed.insert(target_id.to_owned());
        }
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.state.completed.len()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.state.failed.len()
    }

    pub fn persist(&self) -> Result<(), EngineError> {
        write_json_atomic(&self.path, &self.state)
    }
}
