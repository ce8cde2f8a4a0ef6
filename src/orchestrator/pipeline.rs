//! End-to-end run for one (pair, year) dataset, split along the CLI's own
//! seam: `generate_base` takes raw ticks through labeling, regime
//! detection, and pattern mining, leaving a STABLE cache behind and the
//! labels directory deleted; `search_light` consumes that cache (plus the
//! cached candle table) to run the strategy factory, backtester, and
//! ranker, and writes a human-readable report. `run_pipeline` chains both
//! for the common case of a single end-to-end invocation.

use crate::backtest::{backtest_strategy, BacktestParams};
use crate::config::RunConfig;
use crate::domain::{aggregate_ticks, CandleTable, PairYear, Tick};
use crate::features::{extract_features_table, schema_fingerprint};
use crate::orchestrator::cache::{cache_fingerprint_matches, read_cache, read_cache_any, write_cache, DirLock};
use crate::orchestrator::fingerprint::{fingerprint_candles, fingerprint_with_config, Fingerprint};
use crate::orchestrator::ledger::RunLedger;
use crate::patterns::{mine_patterns, MiningInput, PatternCatalog};
use crate::ranker::{rank_results, RankedResult, RankerRow};
use crate::regime::{detect_regimes, RegimeTable};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const LABEL_CHUNK_SIZE: usize = 32;
const KMEANS_SEED: u64 = 0x5EED_F0RE_CA57;

/// Paths every stage derives from a pair/year, rooted at `cache_root`. The
/// STABLE prefix (no run timestamp) names artifacts reusable across runs;
/// the RUN prefix (timestamped) names artifacts unique to one invocation.
struct CachePaths {
    candles: PathBuf,
    labels_dir: PathBuf,
    regimes: PathBuf,
    patterns: PathBuf,
    results: PathBuf,
    report: PathBuf,
}

impl CachePaths {
    fn new(cache_root: &Path, pair_year: &PairYear, run_timestamp: i64) -> Self {
        let stable_prefix = format!("{}_", pair_year.cache_prefix());
        let run_prefix = format!("{stable_prefix}{run_timestamp}_");
        Self {
            candles: cache_root.join(format!("{stable_prefix}candles.bin")),
            labels_dir: cache_root.join(format!("{stable_prefix}labels")),
            regimes: cache_root.join(format!("{stable_prefix}regimes.bin")),
            patterns: cache_root.join(format!("{stable_prefix}patterns.bin")),
            results: cache_root.join(format!("{run_prefix}backtest_results_merged.bin")),
            report: cache_root.join(format!("{run_prefix}LIGHT_REPORT.json")),
        }
    }
}

pub struct GenerateBaseSummary {
    pub pair_year: PairYear,
    pub n_candles: usize,
    pub regimes: RegimeTable,
    pub patterns: PatternCatalog,
}

pub struct RunSummary {
    pub pair_year: PairYear,
    pub n_candles: usize,
    pub regimes: RegimeTable,
    pub patterns: PatternCatalog,
    pub ranked: Vec<RankedResult>,
}

/// Human-readable `{RUN}LIGHT_REPORT.json`: the top of the ranked list plus
/// enough context to read standalone, without decoding the bincode results
/// file.
#[derive(Debug, Serialize, Deserialize)]
pub struct LightReport {
    pub pair_year: String,
    pub n_candles: usize,
    pub n_strategies_ranked: usize,
    pub top: Vec<RankedResult>,
}

const REPORT_TOP_N: usize = 25;

/// Reads a bincode-serialized `Vec<Tick>` produced by the (out-of-scope)
/// upstream converter. The engine never parses the raw tick source format
/// itself — it consumes the same cache wrapper every other artifact uses.
pub fn load_ticks(path: &Path) -> Result<Vec<Tick>> {
    let (_fingerprint, ticks) = read_cache_any(path).with_context(|| format!("failed to load ticks from {}", path.display()))?;
    Ok(ticks)
}

/// `generate-base`: labeling + regime detection + pattern mining. Leaves
/// the candle table, regime table, and pattern catalog cached; the labels
/// directory is created and destroyed within this call.
pub fn generate_base(ticks: &[Tick], pair_year: &PairYear, config: &RunConfig) -> Result<GenerateBaseSummary> {
    let cache_root = &config.persistence.cache_root;
    let paths = CachePaths::new(cache_root, pair_year, 0);

    let _lock = DirLock::acquire(cache_root)?;
    let mut ledger = RunLedger::load_or_default(&config.persistence.ledger_path);
    let dataset = pair_year.cache_prefix();

    let pip_size = pair_year.pip_size();
    let candles = aggregate_ticks(ticks, config.interval_minutes, config.lookback_periods);
    let base_fp = fingerprint_candles(&candles, schema_fingerprint());
    write_cache(&paths.candles, base_fp, &candles)?;

    ledger.mark_running(&dataset, "labeling");
    ledger.save(&config.persistence.ledger_path)?;
    let feature_rows = extract_features_table(&candles, config.feature_windows.long);
    let r_multiple_targets = run_labeling_checkpointed(
        &candles,
        config,
        pip_size,
        &paths.labels_dir,
        &mut ledger,
        &dataset,
        &config.persistence.ledger_path,
    )?;
    ledger.mark_completed(&dataset, "labeling");
    ledger.save(&config.persistence.ledger_path)?;

    let label_fp = fingerprint_with_config(base_fp, &format!("{:?}", config.label_grid));

    let regimes = load_or_compute(&paths.regimes, label_fp, &mut ledger, &dataset, "regimes", config.force_rerun, || {
        Ok(detect_regimes(&feature_rows, &config.regime, KMEANS_SEED))
    })?;

    let patterns = load_or_compute(&paths.patterns, label_fp, &mut ledger, &dataset, "patterns", config.force_rerun, || {
        let mining_input = MiningInput {
            candles: &candles,
            features: &feature_rows,
            regime_id: &regimes.regime_id,
            targets: &r_multiple_targets,
            pip_size,
        };
        Ok(mine_patterns(&mining_input))
    })?;

    // Peak-disk discipline: the labels shards have now been distilled into
    // the pattern catalog, so the multi-GB intermediate directory is freed.
    if paths.labels_dir.exists() {
        std::fs::remove_dir_all(&paths.labels_dir).ok();
    }

    Ok(GenerateBaseSummary {
        pair_year: pair_year.clone(),
        n_candles: candles.len(),
        regimes,
        patterns,
    })
}

/// `search-light`: consumes the STABLE cache `generate_base` left behind
/// (candles, regimes, patterns) and runs the strategy factory, backtester,
/// and ranker, writing a timestamped RUN-prefixed result cache and report.
/// Fails with a clear error if `generate_base` has not run for this dataset.
pub fn search_light(pair_year: &PairYear, config: &RunConfig, run_timestamp: i64) -> Result<RunSummary> {
    let cache_root = &config.persistence.cache_root;
    let stable_paths = CachePaths::new(cache_root, pair_year, 0);
    let run_paths = CachePaths::new(cache_root, pair_year, run_timestamp);

    let _lock = DirLock::acquire(cache_root)?;
    let mut ledger = RunLedger::load_or_default(&config.persistence.ledger_path);
    let dataset = pair_year.cache_prefix();

    let (candles_fp, candles): (Fingerprint, CandleTable) = read_cache_any(&stable_paths.candles)
        .with_context(|| format!("no cached candles for {dataset} — run generate-base first"))?;
    let pip_size = pair_year.pip_size();
    let label_fp = fingerprint_with_config(candles_fp, &format!("{:?}", config.label_grid));

    let regimes: RegimeTable =
        read_cache(&stable_paths.regimes, label_fp).with_context(|| format!("no cached regimes for {dataset} — run generate-base first"))?;
    let patterns: PatternCatalog =
        read_cache(&stable_paths.patterns, label_fp).with_context(|| format!("no cached patterns for {dataset} — run generate-base first"))?;

    ledger.mark_running(&dataset, "strategy_backtest");
    let run_prefix = format!("{}_{run_timestamp}_", pair_year.cache_prefix());
    let rows = run_strategy_backtests(&candles, config, pip_size, cache_root, &stable_paths.candles, &run_prefix, &mut ledger, &dataset)?;
    let ranked = rank_results(&rows, &config.ranker_weights, config.min_trades_for_ranking);
    write_cache(&run_paths.results, label_fp, &ranked)?;
    ledger.mark_completed(&dataset, "strategy_backtest");
    ledger.save(&config.persistence.ledger_path)?;

    let report = LightReport {
        pair_year: pair_year.to_string(),
        n_candles: candles.len(),
        n_strategies_ranked: ranked.len(),
        top: ranked.iter().take(REPORT_TOP_N).cloned().collect(),
    };
    let report_json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&run_paths.report, report_json)?;

    Ok(RunSummary {
        pair_year: pair_year.clone(),
        n_candles: candles.len(),
        regimes,
        patterns,
        ranked,
    })
}

/// Convenience chaining of `generate_base` then `search_light`, for a
/// single end-to-end invocation (and for the cache-idempotence test, which
/// exercises both halves back to back).
pub fn run_pipeline(ticks: &[Tick], pair_year: &PairYear, config: &RunConfig, run_timestamp: i64) -> Result<RunSummary> {
    generate_base(ticks, pair_year, config)?;
    search_light(pair_year, config, run_timestamp)
}

/// Labels the grid in fixed-size chunks, flushing each chunk's r_multiple
/// column (direction-averaged, first config only — the column used as the
/// pattern miner's regression target) to a shard file and checkpointing the
/// ledger after each. The ledger is saved to disk immediately after every
/// checkpoint (not just once the whole grid finishes), so a crash after
/// chunk N's shard is written leaves `resume_index` pointing past it rather
/// than back at zero.
fn run_labeling_checkpointed(
    candles: &CandleTable,
    config: &RunConfig,
    pip_size: f64,
    labels_dir: &Path,
    ledger: &mut RunLedger,
    dataset: &str,
    ledger_path: &Path,
) -> Result<Vec<f64>> {
    use crate::labeling::label_configs;

    let all_configs = config.label_grid.expand();
    let mut target_column: Option<Vec<f64>> = None;

    let resume_chunk = ledger.resume_index(dataset, "labeling");
    let chunks: Vec<_> = all_configs.chunks(LABEL_CHUNK_SIZE).enumerate().collect();

    for (chunk_idx, chunk) in chunks {
        if chunk_idx < resume_chunk {
            continue;
        }

        let columns = label_configs(candles, chunk, pip_size);
        let shard_path = labels_dir.join(format!("chunk_{chunk_idx:05}.bin"));
        write_cache(&shard_path, Fingerprint(chunk_idx as u64), &columns)?;

        if target_column.is_none() {
            if let Some(first) = columns.first() {
                target_column = Some(first.table.r_multiple.iter().map(|&v| v as f64).collect());
            }
        }

        ledger.checkpoint(dataset, "labeling", chunk_idx);
        ledger.save(ledger_path)?;
    }

    Ok(target_column.unwrap_or_else(|| vec![f64::NAN; candles.len()]))
}

#[allow(clippy::too_many_arguments)]
fn load_or_compute<T>(
    path: &Path,
    fingerprint: Fingerprint,
    ledger: &mut RunLedger,
    dataset: &str,
    step: &str,
    force_rerun: bool,
    compute: impl FnOnce() -> Result<T>,
) -> Result<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    if !force_rerun && cache_fingerprint_matches(path, fingerprint) {
        ledger.mark_skipped(dataset, step);
        return read_cache(path, fingerprint);
    }

    ledger.mark_running(dataset, step);
    let value = compute()?;
    write_cache(path, fingerprint, &value)?;
    ledger.mark_completed(dataset, step);
    Ok(value)
}

/// Above this many instances, the grid is evaluated by the subprocess batch
/// path instead of in-process — small enough to exercise on an ordinary
/// dataset (the strategy factory's four templates × their own grids ×
/// the shared 8-entry risk grid comfortably clears it), large enough that a
/// handful of strategies in a unit test never accidentally shard.
const BATCH_SHARD_THRESHOLD: usize = 200;
const BATCH_SHARD_SIZE: usize = 64;

#[allow(clippy::too_many_arguments)]
fn run_strategy_backtests(
    candles: &CandleTable,
    config: &RunConfig,
    pip_size: f64,
    cache_root: &Path,
    candles_path: &Path,
    run_prefix: &str,
    ledger: &mut RunLedger,
    dataset: &str,
) -> Result<Vec<RankerRow>> {
    use crate::strategy::enumerate_strategies;

    let instances = enumerate_strategies(&config.strategy);

    if instances.len() > BATCH_SHARD_THRESHOLD {
        return run_strategy_backtests_sharded(&instances, config, pip_size, cache_root, candles_path, run_prefix, ledger, dataset);
    }

    let params = BacktestParams { pip_size, ..BacktestParams::default() };
    Ok(instances
        .iter()
        .map(|instance| {
            let (_run, metrics) = backtest_strategy(candles, instance, config.strategy.min_cooldown, config.strategy.max_trades_per_day, &params);
            RankerRow {
                instance_name: instance.name.clone(),
                strategy_key: instance.template.to_string() + "_" + &format!("{:?}", instance.parameters),
                metrics,
            }
        })
        .collect())
}

/// Large grids are sharded into subprocesses: the candle table and the
/// `RunConfig` are written to a cache both the batch worker and this process
/// can read, the shard list is planned over instance names, and
/// `batch::run_shards` spawns one `batch_worker` per not-yet-completed shard.
/// A sibling binary in the same target directory is assumed (`cargo build`
/// produces `research` and `batch_worker` side by side).
#[allow(clippy::too_many_arguments)]
fn run_strategy_backtests_sharded(
    instances: &[crate::strategy::StrategyInstance],
    config: &RunConfig,
    pip_size: f64,
    cache_root: &Path,
    candles_path: &Path,
    run_prefix: &str,
    ledger: &mut RunLedger,
    dataset: &str,
) -> Result<Vec<RankerRow>> {
    use crate::orchestrator::batch::{merge_shard_results, plan_shards, run_shards};

    let worker_binary = worker_binary_path()?;
    let config_path = cache_root.join(format!("{run_prefix}config.bin"));
    write_cache(&config_path, Fingerprint(0), config)?;

    let names: Vec<String> = instances.iter().map(|i| i.name.clone()).collect();
    let shards = plan_shards(&names, BATCH_SHARD_SIZE);
    let shard_dir = cache_root.join(format!("{dataset}_shards"));

    let completed = run_shards(&worker_binary, &shard_dir, candles_path, &config_path, pip_size, run_prefix, &shards, ledger, dataset, config.force_rerun)?;
    merge_shard_results(&completed)
}

fn worker_binary_path() -> Result<PathBuf> {
    let mut exe = std::env::current_exe().context("failed to resolve the current executable's path")?;
    exe.set_file_name(if cfg!(windows) { "batch_worker.exe" } else { "batch_worker" });
    Ok(exe)
}

/// The STABLE-prefixed cache paths `--fresh` and `--clean-strategy-cache`
/// reason about, independent of any one run's timestamp.
pub fn cache_paths_for(cache_root: &Path, pair_year: &PairYear) -> Vec<PathBuf> {
    let stable_prefix = format!("{}_", pair_year.cache_prefix());
    vec![
        cache_root.join(format!("{stable_prefix}candles.bin")),
        cache_root.join(format!("{stable_prefix}labels")),
        cache_root.join(format!("{stable_prefix}regimes.bin")),
        cache_root.join(format!("{stable_prefix}patterns.bin")),
    ]
}
