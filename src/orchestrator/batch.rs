//! Subprocess batch sharding for the strategy/backtest stage. Evaluating
//! thousands of (strategy, lot) combinations in-process risks the
//! "26% hang / unbounded memory growth" failure mode the original system
//! documented; isolating each batch in its own process bounds the blast
//! radius of a leak or a panic to one shard.

use crate::error::EngineError;
use crate::orchestrator::ledger::{RunLedger, StepStatus};
use crate::ranker::RankerRow;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::Command;

/// One slice of the strategy grid, identified by its shard index so the
/// worker and the merge step agree on a filename without any shared state.
#[derive(Debug, Clone)]
pub struct ShardSpec {
    pub shard_index: usize,
    pub strategy_names: Vec<String>,
}

fn shard_result_path(shard_dir: &Path, run_prefix: &str, shard_index: usize) -> PathBuf {
    shard_dir.join(format!("{run_prefix}shard_{shard_index:04}.json"))
}

/// Splits `strategy_names` into shards of at most `shard_size` entries.
pub fn plan_shards(strategy_names: &[String], shard_size: usize) -> Vec<ShardSpec> {
    strategy_names
        .chunks(shard_size.max(1))
        .enumerate()
        .map(|(shard_index, chunk)| ShardSpec {
            shard_index,
            strategy_names: chunk.to_vec(),
        })
        .collect()
}

/// Spawns one `batch_worker` subprocess per shard not already completed
/// (detected by filename, per spec.md 4.I), waits for each, and records the
/// outcome in the ledger. A crashed shard (non-zero exit, or a missing
/// result file after exit) is marked `Failed` and excluded from the merge —
/// it does not abort the other shards.
#[allow(clippy::too_many_arguments)]
pub fn run_shards(
    worker_binary: &Path,
    shard_dir: &Path,
    candle_cache_path: &Path,
    config_path: &Path,
    pip_size: f64,
    run_prefix: &str,
    shards: &[ShardSpec],
    ledger: &mut RunLedger,
    dataset: &str,
    force_rerun: bool,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(shard_dir)?;
    let mut completed_paths = Vec::with_capacity(shards.len());

    for shard in shards {
        let step_name = format!("batch_shard_{}", shard.shard_index);
        let result_path = shard_result_path(shard_dir, run_prefix, shard.shard_index);

        if !force_rerun && result_path.exists() {
            ledger.mark_skipped(dataset, &step_name);
            completed_paths.push(result_path);
            continue;
        }

        ledger.mark_running(dataset, &step_name);

        let strategies_arg = shard.strategy_names.join(",");
        let status = Command::new(worker_binary)
            .arg("--candle-cache")
            .arg(candle_cache_path)
            .arg("--config")
            .arg(config_path)
            .arg("--pip-size")
            .arg(pip_size.to_string())
            .arg("--strategies")
            .arg(&strategies_arg)
            .arg("--out")
            .arg(&result_path)
            .status()
            .with_context(|| format!("failed to spawn batch worker for shard {}", shard.shard_index));

        match status {
            Ok(exit) if exit.success() && result_path.exists() => {
                ledger.mark_completed(dataset, &step_name);
                completed_paths.push(result_path);
            }
            Ok(exit) => {
                ledger.mark_failed(dataset, &step_name, EngineError::WorkerCrash(format!("exited with {exit}")));
            }
            Err(e) => {
                ledger.mark_failed(dataset, &step_name, EngineError::WorkerCrash(e.to_string()));
            }
        }
    }

    Ok(completed_paths)
}

/// Reads and concatenates every completed shard's JSON result file into one
/// row list, ready for `ranker::rank_results`. A shard whose file vanished
/// between `run_shards` recording it as completed and this call is treated
/// as a hard error — that should never happen outside manual tampering.
pub fn merge_shard_results(completed_paths: &[PathBuf]) -> Result<Vec<RankerRow>> {
    let mut rows = Vec::new();
    for path in completed_paths {
        let file = File::open(path).with_context(|| format!("failed to open shard result: {}", path.display()))?;
        let reader = BufReader::new(file);
        let shard_rows: Vec<RankerRow> =
            serde_json::from_reader(reader).with_context(|| format!("failed to parse shard result: {}", path.display()))?;
        rows.extend(shard_rows);
    }
    Ok(rows)
}

/// Re-queues every `Failed` shard under `dataset` for another attempt by
/// resetting its ledger entry to `Pending` — the next `run_shards` call
/// will then re-spawn it (its result file, if any, is stale and gets
/// overwritten since `force_rerun` is implied for a retry).
pub fn retry_failed_shards(ledger: &mut RunLedger, dataset: &str) {
    let keys_to_reset: Vec<String> = ledger
        .entries
        .iter()
        .filter(|(k, v)| k.starts_with(&format!("{dataset}::batch_shard_")) && v.status == StepStatus::Failed)
        .map(|(k, _)| k.clone())
        .collect();

    for key in keys_to_reset {
        if let Some(entry) = ledger.entries.get_mut(&key) {
            entry.status = StepStatus::Pending;
            entry.error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shards_split_evenly_with_a_remainder_in_the_last_chunk() {
        let names: Vec<String> = (0..25).map(|i| format!("s{i}")).collect();
        let shards = plan_shards(&names, 10);
        assert_eq!(shards.len(), 3);
        assert_eq!(shards[0].strategy_names.len(), 10);
        assert_eq!(shards[2].strategy_names.len(), 5);
    }

    #[test]
    fn retrying_failed_shards_resets_only_failed_entries_for_the_named_dataset() {
        let mut ledger = RunLedger::default();
        ledger.mark_failed("EURUSD_2023", "batch_shard_0", "oom");
        ledger.mark_completed("EURUSD_2023", "batch_shard_1");
        ledger.mark_failed("GBPUSD_2023", "batch_shard_0", "oom");

        retry_failed_shards(&mut ledger, "EURUSD_2023");

        assert_eq!(ledger.status("EURUSD_2023", "batch_shard_0"), Some(StepStatus::Pending));
        assert_eq!(ledger.status("EURUSD_2023", "batch_shard_1"), Some(StepStatus::Completed));
        assert_eq!(ledger.status("GBPUSD_2023", "batch_shard_0"), Some(StepStatus::Failed));
    }
}
