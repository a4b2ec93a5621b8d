//! Command handlers for the CLI.
//!
//! These are called from `main` after config and logging are established.
//! Per-target extraction failures are recorded and skipped rather than
//! propagated so a single bad site does not abort a batch.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use itemscout_core::{AppConfig, Target};
use itemscout_engine::{
    BatchRunner, JsonDirSink, MappingStore, Orchestrator, ProgressLog, RunOptions,
};
use itemscout_extract::{QualityPolicy, StrategyCatalog};

/// Load the targets to process for a run.
///
/// If `filter` is `Some(id)`, returns that single target and errors if the
/// registry does not contain it. If `None`, returns the full registry.
pub(crate) fn load_targets_for_run(
    config: &AppConfig,
    filter: Option<&str>,
) -> anyhow::Result<Vec<Target>> {
    let registry = itemscout_core::load_targets(&config.targets_path)?;

    match filter {
        Some(id) => {
            let target = registry
                .targets
                .into_iter()
                .find(|t| t.id == id)
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "target '{id}' not found in {}",
                        config.targets_path.display()
                    )
                })?;
            Ok(vec![target])
        }
        None => Ok(registry.targets),
    }
}

fn quality_policy(config: &AppConfig) -> QualityPolicy {
    QualityPolicy {
        min_records: config.min_records,
        min_complete_ratio: config.min_complete_ratio,
    }
}

/// No headless engine is wired in here, so rendered-commerce targets fall
/// back to the fetch-based strategies.
fn build_orchestrator(config: &AppConfig) -> anyhow::Result<Orchestrator> {
    let catalog = StrategyCatalog::builtin(
        config.request_timeout_secs,
        config.render_timeout_secs,
        &config.user_agent,
        None,
    )
    .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;
    Ok(Orchestrator::new(
        catalog,
        quality_policy(config),
        config.saturation_threshold,
    ))
}

/// Probe every candidate strategy for each target and persist what worked.
///
/// Unlike `scrape`, discovery always re-tries all candidates, even for
/// targets that already have a mapping.
///
/// # Errors
///
/// Returns an error if the registry cannot be loaded, the HTTP client cannot
/// be built, or the mapping store cannot be read or written.
pub(crate) async fn run_discover(config: &AppConfig, filter: Option<&str>) -> anyhow::Result<()> {
    let targets = load_targets_for_run(config, filter)?;
    let orchestrator = build_orchestrator(config)?;
    let mut store = MappingStore::load(&config.mapping_store_path)?;

    let total = targets.len();
    tracing::info!(total, "starting discovery");

    for (i, target) in targets.iter().enumerate() {
        let run = orchestrator.discover(target).await;
        match &run.best {
            Some(best) => println!(
                "{}: {} ({} records, {} attempts)",
                target.id,
                best.strategy_id,
                best.records.len(),
                run.attempts.len()
            ),
            None => println!("{}: no working strategy ({})", target.id, run.failure_reason()),
        }
        store.apply_run(&target.id, &run);
        store.persist()?;

        if i + 1 < total {
            tokio::time::sleep(Duration::from_millis(config.politeness_delay_ms)).await;
        }
    }

    Ok(())
}

/// Run the resumable batch: known strategies first, rediscovery when they
/// stop working, records written to the output directory.
///
/// # Errors
///
/// Returns an error for infrastructure failures only (registry, HTTP client,
/// store, progress, or output writes).
pub(crate) async fn run_scrape(config: &AppConfig, filter: Option<&str>) -> anyhow::Result<()> {
    let targets = load_targets_for_run(config, filter)?;
    let orchestrator = build_orchestrator(config)?;
    let store = MappingStore::load(&config.mapping_store_path)?;
    let progress = ProgressLog::load(&config.progress_path)?;
    let sink = JsonDirSink::new(&config.output_dir);

    let runner = Arc::new(BatchRunner::new(
        orchestrator,
        store,
        progress,
        Box::new(sink),
        RunOptions {
            concurrency: config.concurrency,
            politeness_delay_ms: config.politeness_delay_ms,
            checkpoint_every: config.checkpoint_every,
            ..RunOptions::default()
        },
    ));

    let summary = runner.run(targets).await?;

    std::fs::create_dir_all(&config.output_dir)?;
    let summary_path = config.output_dir.join("batch-summary.json");
    std::fs::write(&summary_path, serde_json::to_vec_pretty(&summary)?)?;

    print!("{}", summary.render());
    println!("summary written to {}", summary_path.display());
    Ok(())
}

/// Print the mapping store: best strategy, record counts, and success rates
/// per target, plus the overall strategy distribution.
///
/// # Errors
///
/// Returns an error if the mapping store exists but cannot be read.
pub(crate) fn run_report(config: &AppConfig) -> anyhow::Result<()> {
    let store = MappingStore::load(&config.mapping_store_path)?;
    if store.is_empty() {
        println!("no mappings recorded yet; run `itemscout discover` first");
        return Ok(());
    }

    println!("{} targets mapped", store.len());
    let mut distribution: BTreeMap<String, usize> = BTreeMap::new();
    for mapping in store.iter() {
        let best = mapping.best_strategy_id.as_deref().unwrap_or("-");
        let last = mapping
            .last_success
            .map_or_else(|| "never".to_owned(), |t| t.to_rfc3339());
        println!(
            "  {}: {} ({} records, {:.0}% success over {} attempts, last success {})",
            mapping.target_id,
            best,
            mapping.best_record_count,
            mapping.rolling_success_rate * 100.0,
            mapping.attempts.len(),
            last
        );
        if let Some(id) = &mapping.best_strategy_id {
            *distribution.entry(id.clone()).or_insert(0) += 1;
        }
    }

    if !distribution.is_empty() {
        println!("strategy distribution:");
        for (strategy_id, count) in &distribution {
            println!("  {strategy_id}: {count}");
        }
    }
    Ok(())
}
