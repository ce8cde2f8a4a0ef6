//! The fixed, ordered feature schema. Hashed into the orchestrator's cache
//! fingerprint (SPEC_FULL.md section B) so adding or reordering a feature
//! invalidates stale caches instead of silently misaligning columns.

use std::hash::{Hash, Hasher};

/// Every feature name the extractor can produce, in the fixed order its
/// values are written to a `FeatureRow`. Grouped by family for readability;
/// the order itself is what gets hashed, so do not reorder existing entries
/// — append new ones at the end.
pub const FEATURE_NAMES: &[&str] = &[
    // basic stats
    "mean", "std_dev", "skewness", "kurtosis", "range_pct",
    // derivatives (lagged returns)
    "d1_return", "d2_return", "d3_return", "d4_return", "d5_return",
    // spectral
    "dominant_freq", "spectral_entropy", "spectral_centroid", "wavelet_energy_hi",
    "wavelet_energy_lo",
    // chaos / fractal
    "hurst_exponent", "dfa_alpha", "lyapunov_exponent", "higuchi_fd",
    "permutation_entropy", "sample_entropy",
    // complexity-entropy plane
    "ce_entropy", "ce_complexity",
    // temporal context
    "hour_of_day", "day_of_week", "session_asia", "session_london", "session_ny",
];

pub fn schema_fingerprint() -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for name in FEATURE_NAMES {
        name.hash(&mut hasher);
    }
    hasher.finish()
}
