//! Binary cache file wrapper with metadata, directly generalizing the
//! teacher's `data/timeseries/serde_version.rs::CacheFile` to an arbitrary
//! serializable payload and a fingerprint instead of a fixed interval/version
//! pair.

use crate::error::EngineError;
use crate::orchestrator::fingerprint::Fingerprint;
use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

pub const CACHE_SCHEMA_VERSION: u32 = 1;

#[derive(Serialize, Debug)]
struct CacheFileRef<'a, T> {
    version: u32,
    fingerprint: u64,
    created_at_ms: i64,
    data: &'a T,
}

#[derive(Deserialize, Debug)]
struct CacheFileOwned<T> {
    version: u32,
    fingerprint: u64,
    #[allow(dead_code)]
    created_at_ms: i64,
    data: T,
}

fn create_file_with_parents(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("failed to create file: {}", path.display()))
}

/// Writes `data` to `path` tagged with `fingerprint`, via a temp file in the
/// same directory followed by a rename — the rename is atomic on the same
/// filesystem, so a reader never observes a partially written cache file
/// even if the process is killed mid-write.
pub fn write_cache<T: Serialize>(path: &Path, fingerprint: Fingerprint, data: &T) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    let file = create_file_with_parents(&tmp_path)?;
    let writer = BufWriter::new(file);

    let cache = CacheFileRef {
        version: CACHE_SCHEMA_VERSION,
        fingerprint: fingerprint.0,
        created_at_ms: chrono::Utc::now().timestamp_millis(),
        data,
    };

    bincode::serialize_into(writer, &cache).with_context(|| format!("failed to serialize cache to: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("failed to finalize cache write to: {}", path.display()))?;
    Ok(())
}

/// Reads a cache file and verifies its fingerprint matches `expected`
/// before returning the payload. A mismatch (stale cache from a different
/// input or config) is reported as an error, not silently accepted.
pub fn read_cache<T: DeserializeOwned>(path: &Path, expected: Fingerprint) -> Result<T> {
    let file = File::open(path).with_context(|| format!("failed to open cache: {}", path.display()))?;
    let reader = BufReader::new(file);
    let cache: CacheFileOwned<T> = bincode::deserialize_from(reader).with_context(|| format!("failed to deserialize cache: {}", path.display()))?;

    if cache.version != CACHE_SCHEMA_VERSION {
        return Err(EngineError::CacheSchemaMismatch { found: cache.version, expected: CACHE_SCHEMA_VERSION }.into());
    }
    if cache.fingerprint != expected.0 {
        return Err(EngineError::CacheFingerprintMismatch { found: cache.fingerprint, expected: expected.0 }.into());
    }

    Ok(cache.data)
}

/// Reads a cache file without an externally known fingerprint to check
/// against, returning whatever fingerprint the writer stamped it with. Used
/// by standalone processes (the batch worker) that receive only a path from
/// their parent and have no independent source of truth to validate it
/// against — they trust the orchestrator that wrote the file moments ago.
pub fn read_cache_any<T: DeserializeOwned>(path: &Path) -> Result<(Fingerprint, T)> {
    let file = File::open(path).with_context(|| format!("failed to open cache: {}", path.display()))?;
    let reader = BufReader::new(file);
    let cache: CacheFileOwned<T> = bincode::deserialize_from(reader).with_context(|| format!("failed to deserialize cache: {}", path.display()))?;

    if cache.version != CACHE_SCHEMA_VERSION {
        return Err(EngineError::CacheSchemaMismatch { found: cache.version, expected: CACHE_SCHEMA_VERSION }.into());
    }

    Ok((Fingerprint(cache.fingerprint), cache.data))
}

/// True iff a matching, readable cache already exists — used for skip logic
/// so the caller never deserializes a full payload just to decide whether
/// to recompute.
pub fn cache_fingerprint_matches(path: &Path, expected: Fingerprint) -> bool {
    let Ok(file) = File::open(path) else { return false };
    let reader = BufReader::new(file);
    #[derive(Deserialize)]
    struct Header {
        version: u32,
        fingerprint: u64,
    }
    match bincode::deserialize_from::<_, Header>(reader) {
        Ok(header) => header.version == CACHE_SCHEMA_VERSION && header.fingerprint == expected.0,
        Err(_) => false,
    }
}

/// Coarse-grained advisory lock on a pair's cache directory: a `.lock` file
/// the orchestrator refuses to proceed past if already present (stale locks
/// from a crashed run are a manual-intervention case, same as the teacher's
/// requirement that crashed shards be excluded from a merge rather than
/// silently retried).
pub struct DirLock {
    path: PathBuf,
}

impl DirLock {
    pub fn acquire(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(".lock");
        match fs::OpenOptions::new().create_new(true).write(true).open(&path) {
            Ok(_) => Ok(Self { path }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(EngineError::CacheLocked { dir: dir.to_path_buf(), lock_file: path.clone() }.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
