//! Component I: orchestrator & cache. Ties every other component into one
//! run per (pair, year) dataset, with fingerprint-based skip logic,
//! checkpointed labeling, subprocess batch sharding for large strategy
//! grids, and a run ledger that survives a crash.

pub mod batch;
pub mod cache;
pub mod fingerprint;
pub mod ledger;
pub mod pipeline;

pub use batch::{merge_shard_results, plan_shards, retry_failed_shards, run_shards, ShardSpec};
pub use cache::{read_cache, read_cache_any, write_cache, DirLock};
pub use fingerprint::{fingerprint_candles, Fingerprint};
pub use ledger::{LedgerEntry, RunLedger, StepStatus};
pub use pipeline::{cache_paths_for, generate_base, load_ticks, run_pipeline, search_light, GenerateBaseSummary, LightReport, RunSummary};

use crate::domain::PairYear;
use std::path::Path;

/// `--clean-strategy-cache`: removes the run-unique backtest result shards
/// for one dataset without touching the reusable STABLE caches (labels are
/// already gone by the time a run completes; regimes/patterns stay since
/// they are the expensive-to-recompute artifacts this cache exists for).
pub fn clean_strategy_cache(cache_root: &Path, pair_year: &PairYear) -> anyhow::Result<usize> {
    let prefix = format!("{}_", pair_year.cache_prefix());
    let mut removed = 0;
    for entry in std::fs::read_dir(cache_root)?.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(&prefix) && name.contains("backtest_results_merged") {
            std::fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// `--fresh`: wipes every cached artifact (STABLE and RUN alike) for one
/// dataset and clears its ledger entries, so the next invocation recomputes
/// everything from scratch.
pub fn fresh(cache_root: &Path, ledger_path: &Path, pair_year: &PairYear) -> anyhow::Result<()> {
    let prefix = pair_year.cache_prefix();
    if cache_root.exists() {
        for entry in std::fs::read_dir(cache_root)?.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(&prefix) {
                let path = entry.path();
                if path.is_dir() {
                    std::fs::remove_dir_all(path)?;
                } else {
                    std::fs::remove_file(path)?;
                }
            }
        }
    }

    let mut ledger = RunLedger::load_or_default(ledger_path);
    ledger.entries.retain(|key, _| !key.starts_with(&prefix));
    ledger.save(ledger_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn clean_strategy_cache_only_removes_result_shards_for_the_named_pair() {
        let dir = tempdir().unwrap();
        let py = PairYear::new("EURUSD", 2023);
        std::fs::write(dir.path().join("EURUSD_2023_1000_backtest_results_merged.bin"), b"x").unwrap();
        std::fs::write(dir.path().join("EURUSD_2023_patterns.bin"), b"x").unwrap();
        std::fs::write(dir.path().join("GBPUSD_2023_1000_backtest_results_merged.bin"), b"x").unwrap();

        let removed = clean_strategy_cache(dir.path(), &py).unwrap();
        assert_eq!(removed, 1);
        assert!(dir.path().join("EURUSD_2023_patterns.bin").exists());
        assert!(dir.path().join("GBPUSD_2023_1000_backtest_results_merged.bin").exists());
    }

    #[test]
    fn fresh_clears_both_cache_files_and_ledger_entries_for_the_dataset() {
        let dir = tempdir().unwrap();
        let py = PairYear::new("EURUSD", 2023);
        std::fs::write(dir.path().join("EURUSD_2023_patterns.bin"), b"x").unwrap();
        let ledger_path = dir.path().join("progress.json");
        let mut ledger = RunLedger::default();
        ledger.mark_completed("EURUSD_2023", "labeling");
        ledger.save(&ledger_path).unwrap();

        fresh(dir.path(), &ledger_path, &py).unwrap();

        assert!(!dir.path().join("EURUSD_2023_patterns.bin").exists());
        let reloaded = RunLedger::load_or_default(&ledger_path);
        assert!(reloaded.entries.is_empty());
    }
}
