use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn empty_env_yields_defaults() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.targets_path.to_str().unwrap(), "./config/targets.yaml");
    assert_eq!(
        cfg.mapping_store_path.to_str().unwrap(),
        "./data/strategy-mappings.json"
    );
    assert_eq!(
        cfg.progress_path.to_str().unwrap(),
        "./data/batch-progress.json"
    );
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.render_timeout_secs, 60);
    assert_eq!(cfg.politeness_delay_ms, 2000);
    assert_eq!(cfg.checkpoint_every, 5);
    assert_eq!(cfg.concurrency, 1);
    assert_eq!(cfg.min_records, 3);
    assert!((cfg.min_complete_ratio - 0.5).abs() < f64::EPSILON);
    assert_eq!(cfg.saturation_threshold, 50);
}

#[test]
fn request_timeout_override() {
    let mut map = HashMap::new();
    map.insert("ITEMSCOUT_REQUEST_TIMEOUT_SECS", "10");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.request_timeout_secs, 10);
}

#[test]
fn request_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("ITEMSCOUT_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ITEMSCOUT_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar, got: {result:?}"
    );
}

#[test]
fn concurrency_override() {
    let mut map = HashMap::new();
    map.insert("ITEMSCOUT_CONCURRENCY", "4");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.concurrency, 4);
}

#[test]
fn complete_ratio_override() {
    let mut map = HashMap::new();
    map.insert("ITEMSCOUT_MIN_COMPLETE_RATIO", "0.7");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!((cfg.min_complete_ratio - 0.7).abs() < f64::EPSILON);
}

#[test]
fn complete_ratio_out_of_range_rejected() {
    let mut map = HashMap::new();
    map.insert("ITEMSCOUT_MIN_COMPLETE_RATIO", "1.5");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ITEMSCOUT_MIN_COMPLETE_RATIO"),
        "expected InvalidEnvVar, got: {result:?}"
    );
}

#[test]
fn complete_ratio_not_a_number_rejected() {
    let mut map = HashMap::new();
    map.insert("ITEMSCOUT_MIN_COMPLETE_RATIO", "half");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
}

#[test]
fn saturation_threshold_override() {
    let mut map = HashMap::new();
    map.insert("ITEMSCOUT_SATURATION_THRESHOLD", "80");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.saturation_threshold, 80);
}

#[test]
fn user_agent_override() {
    let mut map = HashMap::new();
    map.insert("ITEMSCOUT_USER_AGENT", "custom-agent/2.0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.user_agent, "custom-agent/2.0");
}
