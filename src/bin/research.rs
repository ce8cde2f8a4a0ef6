//! Thin CLI over the orchestrator: parses flags, builds a `RunConfig`, and
//! calls into the library. No dashboard, no notification channel — every
//! subcommand here corresponds 1:1 to one orchestrator entry point.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fx_research_engine::config::RunConfig;
use fx_research_engine::domain::PairYear;
use fx_research_engine::orchestrator::{self, cache_paths_for, generate_base, load_ticks, search_light, RunLedger};
use std::path::PathBuf;
use tabled::{Table, Tabled};

#[derive(Parser)]
#[command(author, version, about = "Tick-level FX research engine", long_about = None)]
struct Cli {
    /// Cache/ledger root shared by every dataset this invocation touches.
    #[arg(long, global = true, default_value = "cache")]
    cache_root: PathBuf,

    /// Optional TOML file layering overrides on top of compiled-in defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Recompute every cached stage even if its fingerprint still matches.
    #[arg(long, global = true, default_value_t = false)]
    force_rerun: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run labeling + regime detection + pattern mining. Leaves labels
    /// deleted, caches populated.
    GenerateBase {
        /// `PAIR_YEAR` stem, e.g. `EURUSD_2023`.
        #[arg(long)]
        pair_year: String,
        /// Path to a bincode `Vec<Tick>` cache file (the upstream
        /// CSV/parquet conversion is external to this engine).
        #[arg(long)]
        ticks: PathBuf,
    },
    /// Consume caches, run the strategy factory + backtester + ranker,
    /// write a ranked report. Idempotent unless `--force-rerun`.
    SearchLight {
        #[arg(long)]
        pair_year: String,
    },
    /// Delete strategy-stage artifacts (batch shards, merged results,
    /// reports). Never touches labels, regimes, or patterns.
    CleanStrategyCache {
        #[arg(long)]
        pair_year: String,
    },
    /// Print the run ledger for one dataset, or every dataset with a
    /// recorded entry if `--pair-year` is omitted.
    Status {
        #[arg(long)]
        pair_year: Option<String>,
    },
    /// Re-queue every `Failed` step for one dataset back to `Pending`.
    RetryFailed {
        #[arg(long)]
        pair_year: String,
    },
    /// Wipe every cached artifact and ledger entry for one dataset.
    Fresh {
        #[arg(long)]
        pair_year: String,
    },
}

fn main() -> Result<()> {
    let (global_level, crate_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Error)
    };
    env_logger::Builder::new().filter(None, global_level).filter(Some("fx_research_engine"), crate_level).init();

    let cli = Cli::parse();
    let run_config = build_config(&cli)?;

    let result = match &cli.command {
        Commands::GenerateBase { pair_year, ticks } => cmd_generate_base(&run_config, pair_year, ticks),
        Commands::SearchLight { pair_year } => cmd_search_light(&run_config, pair_year),
        Commands::CleanStrategyCache { pair_year } => cmd_clean_strategy_cache(&run_config, pair_year),
        Commands::Status { pair_year } => cmd_status(&run_config, pair_year.as_deref()),
        Commands::RetryFailed { pair_year } => cmd_retry_failed(&run_config, pair_year),
        Commands::Fresh { pair_year } => cmd_fresh(&run_config, pair_year),
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            log::error!("{e:#}");
            std::process::exit(1);
        }
    }
}

fn build_config(cli: &Cli) -> Result<RunConfig> {
    let mut builder = RunConfig::builder().with_cache_root(&cli.cache_root).with_force_rerun(cli.force_rerun);
    if let Some(path) = &cli.config {
        let contents = std::fs::read_to_string(path).with_context(|| format!("failed to read config file: {}", path.display()))?;
        builder = builder.with_toml_file(&contents)?;
    }
    Ok(builder.build())
}

fn parse_pair_year(s: &str) -> Result<PairYear> {
    PairYear::parse(s).with_context(|| format!("'{s}' is not a valid PAIR_YEAR stem (expected e.g. EURUSD_2023)"))
}

fn cmd_generate_base(config: &RunConfig, pair_year: &str, ticks_path: &PathBuf) -> Result<()> {
    let pair_year = parse_pair_year(pair_year)?;
    log::info!("generate-base: loading ticks from {}", ticks_path.display());
    let ticks = load_ticks(ticks_path)?;
    fx_research_engine::domain::validate_ticks(&ticks)?;

    let summary = generate_base(&ticks, &pair_year, config)?;
    log::info!(
        "generate-base complete for {pair_year}: {} candles, {} regimes (silhouette {:.3}), {} regime buckets in the pattern catalog",
        summary.n_candles,
        summary.regimes.k,
        summary.regimes.silhouette,
        summary.patterns.by_regime.len(),
    );
    Ok(())
}

fn cmd_search_light(config: &RunConfig, pair_year: &str) -> Result<()> {
    let pair_year = parse_pair_year(pair_year)?;
    let run_timestamp = chrono::Utc::now().timestamp();
    let summary = search_light(&pair_year, config, run_timestamp)?;
    log::info!("search-light complete for {pair_year}: {} strategies ranked", summary.ranked.len());
    if let Some(top) = summary.ranked.first() {
        log::info!("top strategy: {} (score {:.4})", top.instance_name, top.score);
    }
    Ok(())
}

fn cmd_clean_strategy_cache(config: &RunConfig, pair_year: &str) -> Result<()> {
    let pair_year = parse_pair_year(pair_year)?;
    let removed = orchestrator::clean_strategy_cache(&config.persistence.cache_root, &pair_year)?;
    log::info!("clean-strategy-cache: removed {removed} artifact(s) for {pair_year}");
    Ok(())
}

#[derive(Tabled)]
struct LedgerRow {
    dataset: String,
    step: String,
    status: String,
    resume_index: String,
    error: String,
}

fn cmd_status(config: &RunConfig, pair_year: Option<&str>) -> Result<()> {
    let ledger = RunLedger::load_or_default(&config.persistence.ledger_path);
    let filter_prefix = pair_year.map(parse_pair_year).transpose()?.map(|py| py.cache_prefix());

    let mut rows: Vec<LedgerRow> = ledger
        .entries
        .iter()
        .filter(|(key, _)| filter_prefix.as_ref().is_none_or(|prefix| key.starts_with(prefix.as_str())))
        .map(|(key, entry)| {
            let (dataset, step) = key.split_once("::").unwrap_or((key.as_str(), ""));
            LedgerRow {
                dataset: dataset.to_string(),
                step: step.to_string(),
                status: format!("{:?}", entry.status),
                resume_index: entry.highest_completed_index.map(|i| i.to_string()).unwrap_or_default(),
                error: entry.error.clone().unwrap_or_default(),
            }
        })
        .collect();
    rows.sort_by(|a, b| (a.dataset.as_str(), a.step.as_str()).cmp(&(b.dataset.as_str(), b.step.as_str())));

    if rows.is_empty() {
        println!("(no ledger entries)");
    } else {
        println!("{}", Table::new(rows));
    }
    Ok(())
}

fn cmd_retry_failed(config: &RunConfig, pair_year: &str) -> Result<()> {
    use fx_research_engine::orchestrator::StepStatus;

    let pair_year = parse_pair_year(pair_year)?;
    let dataset = pair_year.cache_prefix();
    let mut ledger = RunLedger::load_or_default(&config.persistence.ledger_path);

    let prefix = format!("{dataset}::");
    let reset = ledger.entries.iter().filter(|(k, e)| k.starts_with(&prefix) && e.status == StepStatus::Failed).count();

    orchestrator::retry_failed_shards(&mut ledger, &dataset);
    ledger.save(&config.persistence.ledger_path)?;
    log::info!("retry-failed: reset {reset} failed step(s) for {dataset} back to pending");
    Ok(())
}

fn cmd_fresh(config: &RunConfig, pair_year: &str) -> Result<()> {
    let pair_year = parse_pair_year(pair_year)?;
    orchestrator::fresh(&config.persistence.cache_root, &config.persistence.ledger_path, &pair_year)?;
    log::info!("fresh: wiped every cached artifact and ledger entry for {pair_year}");

    // `fresh` operates on whole-file removal by prefix; report which of the
    // well-known STABLE paths are now gone, for operator confidence.
    for path in cache_paths_for(&config.persistence.cache_root, &pair_year) {
        log::debug!("{}: {}", path.display(), if path.exists() { "still present" } else { "removed" });
    }
    Ok(())
}
