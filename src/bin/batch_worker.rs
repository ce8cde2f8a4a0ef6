//! Subprocess entry point the orchestrator's `run_shards` spawns once per
//! strategy-grid shard. Runs in complete isolation from the parent process
//! and every sibling shard: a leak or panic here cannot touch the rest of
//! the batch, since the subprocess exiting frees everything it held.

use anyhow::{Context, Result};
use clap::Parser;
use fx_research_engine::backtest::{backtest_strategy, BacktestParams};
use fx_research_engine::config::RunConfig;
use fx_research_engine::domain::CandleTable;
use fx_research_engine::orchestrator::read_cache_any;
use fx_research_engine::ranker::RankerRow;
use fx_research_engine::strategy::enumerate_strategies;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Evaluates one shard of the strategy grid in an isolated process", long_about = None)]
struct Args {
    /// Cached candle table for the dataset this shard belongs to.
    #[arg(long)]
    candle_cache: PathBuf,

    /// Cached `RunConfig` the parent built for this run.
    #[arg(long)]
    config: PathBuf,

    /// Comma-separated strategy instance names to evaluate (a subset of
    /// what the full `enumerate_strategies(&config.strategy)` produces).
    #[arg(long)]
    strategies: String,

    /// Pip size for the dataset's pair (1e-4 non-JPY, 1e-2 JPY) — the one
    /// piece of pair-specific context the config cache doesn't carry.
    #[arg(long)]
    pip_size: f64,

    /// Where to write this shard's JSON result rows.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let wanted: HashSet<&str> = args.strategies.split(',').filter(|s| !s.is_empty()).collect();

    log::info!("batch_worker: {} strategies requested for shard -> {}", wanted.len(), args.out.display());

    let (_fp, candles): (_, CandleTable) =
        read_cache_any(&args.candle_cache).with_context(|| format!("failed to load candle cache: {}", args.candle_cache.display()))?;
    let (_fp, config): (_, RunConfig) =
        read_cache_any(&args.config).with_context(|| format!("failed to load run config: {}", args.config.display()))?;

    let instances = enumerate_strategies(&config.strategy);
    let params = BacktestParams { pip_size: args.pip_size, ..BacktestParams::default() };

    let mut rows = Vec::new();
    for instance in &instances {
        if !wanted.contains(instance.name.as_str()) {
            continue;
        }
        let (_run, metrics) = backtest_strategy(&candles, instance, config.strategy.min_cooldown, config.strategy.max_trades_per_day, &params);
        rows.push(RankerRow {
            instance_name: instance.name.clone(),
            strategy_key: instance.template.to_string() + "_" + &format!("{:?}", instance.parameters),
            metrics,
        });
    }

    log::info!("batch_worker: evaluated {} of {} requested strategies", rows.len(), wanted.len());

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = args.out.with_extension("json.tmp");
    std::fs::write(&tmp_path, serde_json::to_string(&rows)?)?;
    std::fs::rename(&tmp_path, &args.out)?;

    Ok(())
}
