//! Orchestration layer: strategy discovery per target, the persistent
//! target-to-strategy mapping store, batch progress, and the resumable
//! batch runner.

pub mod error;
pub mod mapping;
pub mod orchestrator;
pub mod progress;
pub mod runner;
pub mod sink;
pub mod store;
pub mod summary;

pub use error::EngineError;
pub use mapping::{AttemptRecord, BestResult, Mapping, TargetRun};
pub use orchestrator::Orchestrator;
pub use progress::ProgressLog;
pub use runner::{BatchRunner, RunOptions};
pub use sink::{JsonDirSink, NullSink, RecordSink};
pub use store::MappingStore;
pub use summary::RunSummary;
