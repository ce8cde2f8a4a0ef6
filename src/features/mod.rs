//! The regime & pattern core's feature extractor: basic stats, lagged
//! returns, spectral shape, chaos/fractal measures, the complexity-entropy
//! plane, and calendar context, all computed over a trailing window of mid
//! prices ending at each candle.

pub mod chaos;
pub mod complexity_entropy;
pub mod importance;
pub mod schema;
pub mod spectral;
pub mod stats;
pub mod temporal;

pub use importance::{compute_feature_importance, FeatureImportance};
pub use schema::{FEATURE_NAMES, schema_fingerprint};

use crate::domain::CandleTable;
use rayon::prelude::*;

/// One row of the fixed feature schema, in the exact order of
/// [`FEATURE_NAMES`]. `NaN` entries mean the window was too short for that
/// family's minimum sample threshold, never a thrown error.
#[derive(Debug, Clone, Copy)]
pub struct FeatureRow {
    pub values: [f64; FEATURE_NAMES.len()],
}

impl FeatureRow {
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|idx| self.values[idx])
    }
}

/// Extracts one feature row for the window of mid prices ending at `idx`
/// (inclusive), looking back at most `max_window` candles.
pub fn extract_features(candles: &CandleTable, idx: usize, max_window: usize) -> FeatureRow {
    let start = idx.saturating_sub(max_window.saturating_sub(1));
    let window = &candles.mid[start..=idx];

    let basic = stats::basic_stats(window);
    let lagged = stats::lagged_returns(window);
    let spectral = spectral::spectral_features(window);
    let chaos = chaos::chaos_features(window);
    let ce = complexity_entropy::complexity_entropy_plane(window, 3);
    let temporal = temporal::temporal_context(candles.t_open_ns[idx]);

    let values = [
        basic.mean,
        basic.std_dev,
        basic.skewness,
        basic.kurtosis,
        basic.range_pct,
        lagged[0],
        lagged[1],
        lagged[2],
        lagged[3],
        lagged[4],
        spectral.dominant_freq,
        spectral.spectral_entropy,
        spectral.spectral_centroid,
        spectral.wavelet_energy_hi,
        spectral.wavelet_energy_lo,
        chaos.hurst_exponent,
        chaos.dfa_alpha,
        chaos.lyapunov_exponent,
        chaos.higuchi_fd,
        chaos.permutation_entropy,
        chaos.sample_entropy,
        ce.entropy,
        ce.complexity,
        temporal.hour_of_day,
        temporal.day_of_week,
        temporal.session_asia,
        temporal.session_london,
        temporal.session_ny,
    ];

    FeatureRow { values }
}

/// Extracts a feature row for every candle in the table, in parallel over
/// candle indices (each window is an independent, read-only slice).
pub fn extract_features_table(candles: &CandleTable, max_window: usize) -> Vec<FeatureRow> {
    crate::trace_time!("features::extract_features_table", 500_000, {
        (0..candles.len())
            .into_par_iter()
            .map(|idx| extract_features(candles, idx, max_window))
            .collect()
    })
}

/// Pearson correlation of two equal-length mid-price return series — the
/// optional cross-pair correlation pass. `NaN` if either series has zero
/// variance or the inputs are too short to compare.
pub fn cross_pair_correlation(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.len() < 2 {
        return f64::NAN;
    }
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..a.len() {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a <= f64::EPSILON || var_b <= f64::EPSILON {
        f64::NAN
    } else {
        cov / (var_a.sqrt() * var_b.sqrt())
    }
}
