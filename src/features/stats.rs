//! Basic distributional stats and lagged-return "derivative" features over a
//! trailing window of mid prices.

use statrs::statistics::{Data, Distribution};

pub const MIN_SAMPLES_BASIC: usize = 5;
pub const MAX_LAG: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct BasicStats {
    pub mean: f64,
    pub std_dev: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub range_pct: f64,
}

/// Mean/std/skew/kurtosis plus (high-low)/mean over the window. Returns all
/// `NaN` below [`MIN_SAMPLES_BASIC`] samples, per the "never throw below
/// threshold" rule the kernels share with the labeling stage.
pub fn basic_stats(window: &[f64]) -> BasicStats {
    if window.len() < MIN_SAMPLES_BASIC {
        return BasicStats {
            mean: f64::NAN,
            std_dev: f64::NAN,
            skewness: f64::NAN,
            kurtosis: f64::NAN,
            range_pct: f64::NAN,
        };
    }

    let data = Data::new(window.to_vec());
    let mean = data.mean().unwrap_or(f64::NAN);
    let std_dev = data.std_dev().unwrap_or(f64::NAN);

    let (skewness, kurtosis) = if std_dev > f64::EPSILON {
        let n = window.len() as f64;
        let m3: f64 = window.iter().map(|x| (x - mean).powi(3)).sum::<f64>() / n;
        let m4: f64 = window.iter().map(|x| (x - mean).powi(4)).sum::<f64>() / n;
        (m3 / std_dev.powi(3), m4 / std_dev.powi(4) - 3.0)
    } else {
        (0.0, 0.0)
    };

    let high = window.iter().cloned().fold(f64::MIN, f64::max);
    let low = window.iter().cloned().fold(f64::MAX, f64::min);
    let range_pct = if mean.abs() > f64::EPSILON {
        (high - low) / mean
    } else {
        0.0
    };

    BasicStats {
        mean,
        std_dev,
        skewness,
        kurtosis,
        range_pct,
    }
}

/// Lagged percentage returns `(x[n] - x[n-k]) / x[n-k]` for k in 1..=5.
/// NaN for any lag the window isn't long enough to support.
pub fn lagged_returns(window: &[f64]) -> [f64; MAX_LAG] {
    let mut out = [f64::NAN; MAX_LAG];
    let n = window.len();
    if n == 0 {
        return out;
    }
    let last = window[n - 1];
    for (k, slot) in out.iter_mut().enumerate() {
        let lag = k + 1;
        if n > lag {
            let base = window[n - 1 - lag];
            if base.abs() > f64::EPSILON {
                *slot = (last - base) / base;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_is_all_nan() {
        let stats = basic_stats(&[1.0, 1.1]);
        assert!(stats.mean.is_nan());
    }

    #[test]
    fn constant_series_has_zero_spread() {
        let stats = basic_stats(&[1.0; 10]);
        assert!((stats.std_dev).abs() < 1e-9);
        assert!((stats.range_pct).abs() < 1e-9);
    }

    #[test]
    fn lagged_returns_respect_window_length() {
        let window = [1.0, 1.01, 1.02];
        let rets = lagged_returns(&window);
        assert!((rets[0] - (1.02 - 1.01) / 1.01).abs() < 1e-9);
        assert!(rets[2].is_nan(), "lag 3 exceeds window length");
    }
}
