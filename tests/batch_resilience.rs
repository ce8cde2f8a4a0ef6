//! Subprocess batch resilience (component I): a shard whose worker process
//! never starts (or never produces a result file) must be recorded as
//! `Failed` and excluded from the merge, without aborting its sibling
//! shards — the behavior `run_strategy_backtests_sharded` relies on for
//! large strategy grids.

use fx_research_engine::orchestrator::{merge_shard_results, plan_shards, retry_failed_shards, run_shards, RunLedger, StepStatus};
use std::path::PathBuf;

#[test]
fn a_shard_whose_worker_binary_does_not_exist_is_marked_failed_and_excluded_from_the_merge() {
    let dir = tempfile::tempdir().unwrap();
    let shard_dir = dir.path().join("shards");
    let candle_cache = dir.path().join("candles.bin");
    let config_cache = dir.path().join("config.bin");
    std::fs::write(&candle_cache, b"irrelevant for this test").unwrap();
    std::fs::write(&config_cache, b"irrelevant for this test").unwrap();

    let names: Vec<String> = (0..5).map(|i| format!("strategy_{i}")).collect();
    let shards = plan_shards(&names, 2);
    assert_eq!(shards.len(), 3);

    let mut ledger = RunLedger::default();
    let nonexistent_worker = PathBuf::from("/nonexistent/path/to/batch_worker_that_does_not_exist");

    let completed = run_shards(&nonexistent_worker, &shard_dir, &candle_cache, &config_cache, 1e-4, "EURUSD_2023_1_", &shards, &mut ledger, "EURUSD_2023", false).unwrap();

    assert!(completed.is_empty(), "no shard can complete when the worker binary can't be spawned");
    for shard in &shards {
        assert_eq!(ledger.status("EURUSD_2023", &format!("batch_shard_{}", shard.shard_index)), Some(StepStatus::Failed));
    }

    let rows = merge_shard_results(&completed).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn retrying_failed_shards_lets_a_subsequent_run_attempt_them_again() {
    let mut ledger = RunLedger::default();
    ledger.mark_failed("EURUSD_2023", "batch_shard_0", "worker exited with exit status: 1");
    ledger.mark_completed("EURUSD_2023", "batch_shard_1");

    retry_failed_shards(&mut ledger, "EURUSD_2023");

    assert_eq!(ledger.status("EURUSD_2023", "batch_shard_0"), Some(StepStatus::Pending));
    assert_eq!(ledger.status("EURUSD_2023", "batch_shard_1"), Some(StepStatus::Completed));
}
