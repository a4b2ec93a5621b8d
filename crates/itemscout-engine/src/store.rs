//! JSON-backed mapping store, keyed by target id.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::mapping::{Mapping, TargetRun};

pub struct MappingStore {
    path: PathBuf,
    mappings: BTreeMap<String, Mapping>,
}

impl MappingStore {
    /// Load the store from `path`. A missing file is an empty store, not an
    /// error; a present but unreadable or malformed file is fatal so a
    /// corrupted history is never silently discarded.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let path = path.into();
        let mappings = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| EngineError::Serialize {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(EngineError::io(&path, e)),
        };
        Ok(Self { path, mappings })
    }

    #[must_use]
    pub fn get(&self, target_id: &str) -> Option<&Mapping> {
        self.mappings.get(target_id)
    }

    /// Best known strategy id for a target, if one has ever been recorded.
    #[must_use]
    pub fn best_strategy(&self, target_id: &str) -> Option<&str> {
        self.get(target_id)
            .and_then(|m| m.best_strategy_id.as_deref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mapping> {
        self.mappings.values()
    }

    /// Fold one run's outcome into the target's mapping: append its attempts
    /// to the history, recompute the success rate over the whole history,
    /// and update the best strategy when the run produced an accepted
    /// result.
    pub fn apply_run(&mut self, target_id: &str, run: &TargetRun) {
        let mapping = self
            .mappings
            .entry(target_id.to_owned())
            .or_insert_with(|| Mapping::new(target_id));

        mapping.attempts.extend(run.attempts.iter().cloned());

        let succeeded = mapping.attempts.iter().filter(|a| a.succeeded).count();
        #[allow(clippy::cast_precision_loss)]
        if !mapping.attempts.is_empty() {
            mapping.rolling_success_rate = succeeded as f64 / mapping.attempts.len() as f64;
        }

        if let Some(best) = &run.best {
            mapping.best_strategy_id = Some(best.strategy_id.clone());
            mapping.best_record_count = best.records.len();
            mapping.last_success = run
                .attempts
                .iter()
                .rev()
                .find(|a| a.succeeded && a.strategy_id == best.strategy_id)
                .map(|a| a.timestamp_utc);
        }
    }

    /// Write the store atomically: serialize to a sibling tmp file, then
    /// rename over the target so a crash mid-write never truncates it.
    pub fn persist(&self) -> Result<(), EngineError> {
        write_json_atomic(&self.path, &self.mappings)
    }
}

pub(crate) fn write_json_atomic<T: serde::Serialize>(
    path: &Path,
    value: &T,
) -> Result<(), EngineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
        }
    }

    let raw = serde_json::to_vec_pretty(value).map_err(|source| EngineError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, raw).map_err(|e| EngineError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| EngineError::io(path, e))
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
