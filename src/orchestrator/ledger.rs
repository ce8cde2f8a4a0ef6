//! The run ledger: source of truth for `--status`, `--retry-failed`, and
//! `--fresh`. Every step the orchestrator attempts gets one entry, updated
//! in place as it moves through its lifecycle; a sub-step failure never
//! aborts the whole run, it just marks that entry `Failed` and the
//! orchestrator continues with the next dataset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub step: String,
    pub status: StepStatus,
    pub highest_completed_index: Option<usize>,
    pub error: Option<String>,
    pub updated_at_ms: i64,
}

/// Keyed by `{pair_year}::{step}` so one ledger file covers a whole
/// mass-test run across many datasets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunLedger {
    pub entries: BTreeMap<String, LedgerEntry>,
}

fn key(dataset: &str, step: &str) -> String {
    format!("{dataset}::{step}")
}

impl RunLedger {
    pub fn load_or_default(path: &Path) -> Self {
        fs::read_to_string(path).ok().and_then(|s| serde_json::from_str(&s).ok()).unwrap_or_default()
    }

    /// Atomic write via a temp file + rename, same discipline as the
    /// binary cache — the ledger is read on every `--status` invocation
    /// and must never be observed half-written.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_string_pretty(self)?)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    pub fn mark_running(&mut self, dataset: &str, step: &str) {
        self.entries.insert(
            key(dataset, step),
            LedgerEntry {
                step: step.to_string(),
                status: StepStatus::Running,
                highest_completed_index: None,
                error: None,
                updated_at_ms: chrono::Utc::now().timestamp_millis(),
            },
        );
    }

    /// Marks a step fully done. Preserves any `highest_completed_index`
    /// already recorded by `checkpoint` — a completed step is the terminal
    /// state of the same progress a crash-resume would otherwise read, not a
    /// fresh entry that should erase it.
    pub fn mark_completed(&mut self, dataset: &str, step: &str) {
        let entry = self.entries.entry(key(dataset, step)).or_insert_with(|| LedgerEntry {
            step: step.to_string(),
            status: StepStatus::Completed,
            highest_completed_index: None,
            error: None,
            updated_at_ms: chrono::Utc::now().timestamp_millis(),
        });
        entry.status = StepStatus::Completed;
        entry.error = None;
        entry.updated_at_ms = chrono::Utc::now().timestamp_millis();
    }

    pub fn mark_failed(&mut self, dataset: &str, step: &str, error: impl ToString) {
        self.entries.insert(
            key(dataset, step),
            LedgerEntry {
                step: step.to_string(),
                status: StepStatus::Failed,
                highest_completed_index: None,
                error: Some(error.to_string()),
                updated_at_ms: chrono::Utc::now().timestamp_millis(),
            },
        );
    }

    pub fn mark_skipped(&mut self, dataset: &str, step: &str) {
        self.entries.insert(
            key(dataset, step),
            LedgerEntry {
                step: step.to_string(),
                status: StepStatus::Skipped,
                highest_completed_index: None,
                error: None,
                updated_at_ms: chrono::Utc::now().timestamp_millis(),
            },
        );
    }

    /// Checkpoint progress within a long step — the highest fully-flushed
    /// configuration index, so a restart can resume past it instead of
    /// redoing already-completed work.
    pub fn checkpoint(&mut self, dataset: &str, step: &str, completed_index: usize) {
        let entry = self.entries.entry(key(dataset, step)).or_insert_with(|| LedgerEntry {
            step: step.to_string(),
            status: StepStatus::Running,
            highest_completed_index: None,
            error: None,
            updated_at_ms: chrono::Utc::now().timestamp_millis(),
        });
        entry.highest_completed_index = Some(completed_index);
        entry.updated_at_ms = chrono::Utc::now().timestamp_millis();
    }

    pub fn resume_index(&self, dataset: &str, step: &str) -> usize {
        self.entries.get(&key(dataset, step)).and_then(|e| e.highest_completed_index).map(|i| i + 1).unwrap_or(0)
    }

    /// Distinct dataset prefixes (the part of the key before `::`) with at
    /// least one `Failed` step, for `--status`/`--retry-failed` to iterate.
    pub fn failed_datasets(&self) -> Vec<&str> {
        let mut datasets: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, e)| e.status == StepStatus::Failed)
            .filter_map(|(k, _)| k.split_once("::").map(|(dataset, _)| dataset))
            .collect();
        datasets.sort_unstable();
        datasets.dedup();
        datasets
    }

    pub fn status(&self, dataset: &str, step: &str) -> Option<StepStatus> {
        self.entries.get(&key(dataset, step)).map(|e| e.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn a_saved_and_reloaded_ledger_round_trips_statuses() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.json");
        let mut ledger = RunLedger::default();
        ledger.mark_completed("EURUSD_2023", "labeling");
        ledger.mark_failed("EURUSD_2023", "patterns", "ran out of disk");
        ledger.save(&path).unwrap();

        let reloaded = RunLedger::load_or_default(&path);
        assert_eq!(reloaded.status("EURUSD_2023", "labeling"), Some(StepStatus::Completed));
        assert_eq!(reloaded.status("EURUSD_2023", "patterns"), Some(StepStatus::Failed));
    }

    #[test]
    fn checkpointing_lets_a_restart_resume_past_the_highest_completed_index() {
        let mut ledger = RunLedger::default();
        assert_eq!(ledger.resume_index("EURUSD_2023", "labeling"), 0);
        ledger.checkpoint("EURUSD_2023", "labeling", 49);
        assert_eq!(ledger.resume_index("EURUSD_2023", "labeling"), 50);
    }

    #[test]
    fn mark_completed_preserves_the_checkpointed_index() {
        let mut ledger = RunLedger::default();
        ledger.checkpoint("EURUSD_2023", "labeling", 149);
        ledger.mark_completed("EURUSD_2023", "labeling");
        assert_eq!(ledger.status("EURUSD_2023", "labeling"), Some(StepStatus::Completed));
        assert_eq!(ledger.resume_index("EURUSD_2023", "labeling"), 150);
    }

    #[test]
    fn failed_datasets_returns_the_dataset_prefix_not_the_step_name() {
        let mut ledger = RunLedger::default();
        ledger.mark_failed("EURUSD_2023", "batch_shard_3", "oom");
        ledger.mark_completed("GBPUSD_2024", "labeling");
        let failed = ledger.failed_datasets();
        assert_eq!(failed, vec!["EURUSD_2023"]);
    }

    #[test]
    fn a_missing_ledger_file_loads_as_an_empty_default() {
        let ledger = RunLedger::load_or_default(Path::new("/nonexistent/progress.json"));
        assert!(ledger.entries.is_empty());
    }
}
