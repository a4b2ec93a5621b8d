use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any set env var has an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without reading `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if any set env var has an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The parsing/validation logic is decoupled from the actual environment so it
/// can be tested with a pure `HashMap` lookup, without `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        let value = raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("{value} is outside 0.0..=1.0"),
            });
        }
        Ok(value)
    };

    let log_level = or_default("ITEMSCOUT_LOG_LEVEL", "info");
    let targets_path = PathBuf::from(or_default(
        "ITEMSCOUT_TARGETS_PATH",
        "./config/targets.yaml",
    ));
    let mapping_store_path = PathBuf::from(or_default(
        "ITEMSCOUT_MAPPING_PATH",
        "./data/strategy-mappings.json",
    ));
    let progress_path = PathBuf::from(or_default(
        "ITEMSCOUT_PROGRESS_PATH",
        "./data/batch-progress.json",
    ));
    let output_dir = PathBuf::from(or_default("ITEMSCOUT_OUTPUT_DIR", "./data/records"));

    let user_agent = or_default(
        "ITEMSCOUT_USER_AGENT",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    );

    let request_timeout_secs = parse_u64("ITEMSCOUT_REQUEST_TIMEOUT_SECS", "30")?;
    let render_timeout_secs = parse_u64("ITEMSCOUT_RENDER_TIMEOUT_SECS", "60")?;
    let politeness_delay_ms = parse_u64("ITEMSCOUT_POLITENESS_DELAY_MS", "2000")?;
    let checkpoint_every = parse_usize("ITEMSCOUT_CHECKPOINT_EVERY", "5")?;
    let concurrency = parse_usize("ITEMSCOUT_CONCURRENCY", "1")?;
    let min_records = parse_usize("ITEMSCOUT_MIN_RECORDS", "3")?;
    let min_complete_ratio = parse_f64("ITEMSCOUT_MIN_COMPLETE_RATIO", "0.5")?;
    let saturation_threshold = parse_usize("ITEMSCOUT_SATURATION_THRESHOLD", "50")?;

    Ok(AppConfig {
        log_level,
        targets_path,
        mapping_store_path,
        progress_path,
        output_dir,
        user_agent,
        request_timeout_secs,
        render_timeout_secs,
        politeness_delay_ms,
        checkpoint_every,
        concurrency,
        min_records,
        min_complete_ratio,
        saturation_threshold,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
