use std::path::PathBuf;

/// Application configuration, loaded from `ITEMSCOUT_*` env vars.
///
/// Every knob has a default; an empty environment yields a usable config.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub targets_path: PathBuf,
    pub mapping_store_path: PathBuf,
    pub progress_path: PathBuf,
    pub output_dir: PathBuf,
    pub user_agent: String,
    /// Timeout for non-rendering strategies (one HTTP round trip).
    pub request_timeout_secs: u64,
    /// Timeout for the rendered strategy (navigation + scroll cycles).
    pub render_timeout_secs: u64,
    pub politeness_delay_ms: u64,
    pub checkpoint_every: usize,
    pub concurrency: usize,
    /// Quality policy: minimum record count for an acceptable record set.
    pub min_records: usize,
    /// Quality policy: minimum fraction of complete records.
    pub min_complete_ratio: f64,
    /// Stop trying further strategies once an accepted result exceeds this
    /// record count.
    pub saturation_threshold: usize,
}
