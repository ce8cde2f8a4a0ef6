//! Cheap content fingerprint for cacheable artifacts: cache files are keyed
//! by (fingerprint, config) rather than rehashing the full tick/candle series
//! on every run.

use crate::domain::CandleTable;
use std::hash::{Hash, Hasher};

/// Up to this many interior mid prices are folded into the digest, sampled
/// at a fixed stride so the fingerprint cost stays O(256) regardless of
/// series length.
const SAMPLE_CAP: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Fingerprint(pub u64);

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Hashes `(length, first mid, last mid, schema, a fixed-stride interior
/// sample of mid prices)`. Two candle tables with the same fingerprint are
/// assumed identical for caching purposes — a collision would silently
/// reuse a stale cache, which is why the sample stride is dense enough to
/// catch a changed middle section without scanning the whole series.
pub fn fingerprint_candles(candles: &CandleTable, schema_fingerprint: u64) -> Fingerprint {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    candles.len().hash(&mut hasher);
    schema_fingerprint.hash(&mut hasher);

    if candles.is_empty() {
        return Fingerprint(hasher.finish());
    }

    candles.mid[0].to_bits().hash(&mut hasher);
    candles.mid[candles.len() - 1].to_bits().hash(&mut hasher);

    let stride = (candles.len() / SAMPLE_CAP).max(1);
    for idx in (0..candles.len()).step_by(stride).take(SAMPLE_CAP) {
        candles.mid[idx].to_bits().hash(&mut hasher);
    }

    Fingerprint(hasher.finish())
}

/// Folds caller-supplied config parameters (already formatted as a stable
/// string, e.g. a serialized grid) into a fingerprint — two runs with the
/// same candles but different label/feature config must not collide.
pub fn fingerprint_with_config(base: Fingerprint, config_repr: &str) -> Fingerprint {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    base.0.hash(&mut hasher);
    config_repr.hash(&mut hasher);
    Fingerprint(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Candle;

    fn candles(n: usize, seed: f64) -> CandleTable {
        let mut table = CandleTable::default();
        for i in 0..n {
            let p = seed + i as f64 * 1e-4;
            table.push(Candle::new((i as i64) * 60_000_000_000, p, p + 1e-4, p - 1e-4, p, 1));
        }
        table
    }

    #[test]
    fn identical_series_fingerprint_identically() {
        let a = candles(500, 1.1);
        let b = candles(500, 1.1);
        assert_eq!(fingerprint_candles(&a, 7), fingerprint_candles(&b, 7));
    }

    #[test]
    fn a_changed_interior_value_changes_the_fingerprint() {
        let a = candles(500, 1.1);
        let mut b = candles(500, 1.1);
        b.mid[250] += 0.01;
        assert_ne!(fingerprint_candles(&a, 7), fingerprint_candles(&b, 7));
    }

    #[test]
    fn config_folding_distinguishes_otherwise_identical_bases() {
        let base = Fingerprint(42);
        let a = fingerprint_with_config(base, "grid-v1");
        let b = fingerprint_with_config(base, "grid-v2");
        assert_ne!(a, b);
    }
}
