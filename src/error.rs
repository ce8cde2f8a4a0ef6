//! The engine's error taxonomy (spec.md section 7). Variants map directly
//! onto the documented categories; only the ones the taxonomy actually marks
//! fatal (`InputError`, `ConfigError`, cache integrity failures, a crashed
//! batch worker) are represented as a raised `Result` error. The others
//! (`InsufficientDataError`, `KernelError`) are sentinel values by design —
//! `NaN`/`HitKind::None` — and never construct one of these variants.
//!
//! Component APIs return `EngineError` directly where the failure is
//! domain-specific; the orchestrator boundary wraps it in `anyhow::Result`
//! via `.context(...)`, the same convention the teacher uses around its own
//! I/O errors.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed or structurally invalid tick/candle input: non-monotonic
    /// timestamps, a crossed bid/ask book, an empty series.
    #[error("invalid input: {0}")]
    Input(String),

    /// A `RunConfig` that can't be assembled or parsed: a malformed TOML
    /// file, an empty label grid, or any other caller-must-fix condition.
    #[error("invalid config: {0}")]
    Config(String),

    /// A cache file's embedded schema version doesn't match the reader's.
    #[error("cache schema version mismatch: file v{found} vs expected v{expected}")]
    CacheSchemaMismatch { found: u32, expected: u32 },

    /// A cache file's fingerprint doesn't match what the caller expected —
    /// stale data from a different input or config, never silently accepted.
    #[error("cache fingerprint mismatch: file {found:016x} vs expected {expected:016x}")]
    CacheFingerprintMismatch { found: u64, expected: u64 },

    /// Another run already holds the advisory lock on this cache directory.
    #[error("cache directory {dir} is locked by another run (stale lock? remove {lock_file} manually)")]
    CacheLocked { dir: PathBuf, lock_file: PathBuf },

    /// A batch-worker subprocess exited non-zero or never wrote its result
    /// file. Recorded on the failed shard's ledger entry; the merge proceeds
    /// with the remaining shards per spec.md 4.I.
    #[error("worker crashed: {0}")]
    WorkerCrash(String),
}
