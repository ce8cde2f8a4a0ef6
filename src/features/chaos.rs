//! Chaos and fractal features: Hurst exponent, DFA, largest Lyapunov
//! exponent (Rosenstein), Higuchi fractal dimension, permutation entropy,
//! sample entropy. All return `NaN` below their minimum sample count rather
//! than panicking or erroring, matching the rest of the feature kernels.

pub const MIN_SAMPLES_CHAOS: usize = 30;

#[derive(Debug, Clone, Copy, Default)]
pub struct ChaosFeatures {
    pub hurst_exponent: f64,
    pub dfa_alpha: f64,
    pub lyapunov_exponent: f64,
    pub higuchi_fd: f64,
    pub permutation_entropy: f64,
    pub sample_entropy: f64,
}

pub fn chaos_features(window: &[f64]) -> ChaosFeatures {
    if window.len() < MIN_SAMPLES_CHAOS {
        return ChaosFeatures {
            hurst_exponent: f64::NAN,
            dfa_alpha: f64::NAN,
            lyapunov_exponent: f64::NAN,
            higuchi_fd: f64::NAN,
            permutation_entropy: f64::NAN,
            sample_entropy: f64::NAN,
        };
    }

    ChaosFeatures {
        hurst_exponent: hurst_rescaled_range(window),
        dfa_alpha: dfa_alpha(window),
        lyapunov_exponent: largest_lyapunov_rosenstein(window),
        higuchi_fd: higuchi_fractal_dimension(window, 5),
        permutation_entropy: permutation_entropy(window, 3),
        sample_entropy: sample_entropy(window, 2, 0.2),
    }
}

/// Classic rescaled-range Hurst exponent over a handful of sub-window sizes.
fn hurst_rescaled_range(series: &[f64]) -> f64 {
    let n = series.len();
    let mean = series.iter().sum::<f64>() / n as f64;
    let deviations: Vec<f64> = series.iter().map(|x| x - mean).collect();

    let mut cumulative = Vec::with_capacity(n);
    let mut running = 0.0;
    for d in &deviations {
        running += d;
        cumulative.push(running);
    }

    let candidate_sizes: Vec<usize> = [8usize, 16, 32]
        .into_iter()
        .filter(|&s| s * 2 <= n)
        .collect();
    if candidate_sizes.is_empty() {
        return f64::NAN;
    }

    let mut log_sizes = Vec::new();
    let mut log_rs = Vec::new();

    for &size in &candidate_sizes {
        let chunks = n / size;
        let mut rs_values = Vec::with_capacity(chunks);
        for c in 0..chunks {
            let start = c * size;
            let end = start + size;
            let chunk = &cumulative[start..end];
            let range = chunk.iter().cloned().fold(f64::MIN, f64::max)
                - chunk.iter().cloned().fold(f64::MAX, f64::min);
            let chunk_std = std_dev(&series[start..end]);
            if chunk_std > f64::EPSILON {
                rs_values.push(range / chunk_std);
            }
        }
        if !rs_values.is_empty() {
            let avg_rs = rs_values.iter().sum::<f64>() / rs_values.len() as f64;
            if avg_rs > f64::EPSILON {
                log_sizes.push((size as f64).ln());
                log_rs.push(avg_rs.ln());
            }
        }
    }

    linear_regression_slope(&log_sizes, &log_rs)
}

/// Detrended fluctuation analysis scaling exponent.
fn dfa_alpha(series: &[f64]) -> f64 {
    let n = series.len();
    let mean = series.iter().sum::<f64>() / n as f64;

    let mut profile = Vec::with_capacity(n);
    let mut running = 0.0;
    for &x in series {
        running += x - mean;
        profile.push(running);
    }

    let candidate_sizes: Vec<usize> = [8usize, 16, 32].into_iter().filter(|&s| s * 2 <= n).collect();
    if candidate_sizes.is_empty() {
        return f64::NAN;
    }

    let mut log_sizes = Vec::new();
    let mut log_fluct = Vec::new();

    for &size in &candidate_sizes {
        let segments = n / size;
        let mut sq_errors = Vec::with_capacity(segments);
        for s in 0..segments {
            let start = s * size;
            let end = start + size;
            let segment = &profile[start..end];
            let xs: Vec<f64> = (0..size).map(|i| i as f64).collect();
            let slope = linear_regression_slope(&xs, segment);
            let intercept = segment[0];
            let mse: f64 = segment
                .iter()
                .enumerate()
                .map(|(i, &y)| {
                    let fitted = intercept + slope * i as f64;
                    (y - fitted).powi(2)
                })
                .sum::<f64>()
                / size as f64;
            sq_errors.push(mse);
        }
        let avg_fluct = (sq_errors.iter().sum::<f64>() / sq_errors.len() as f64).sqrt();
        if avg_fluct > f64::EPSILON {
            log_sizes.push((size as f64).ln());
            log_fluct.push(avg_fluct.ln());
        }
    }

    linear_regression_slope(&log_sizes, &log_fluct)
}

/// Rosenstein's method for the largest Lyapunov exponent, using a 2-sample
/// time-delay embedding (appropriate for short financial windows).
fn largest_lyapunov_rosenstein(series: &[f64]) -> f64 {
    let m = 2usize;
    let tau = 1usize;
    let n = series.len();
    if n <= m * tau + 2 {
        return f64::NAN;
    }

    let embed_len = n - (m - 1) * tau;
    let embedded: Vec<Vec<f64>> = (0..embed_len)
        .map(|i| (0..m).map(|j| series[i + j * tau]).collect())
        .collect();

    let min_separation = (embed_len / 10).max(1);
    let mut log_divergences = Vec::new();

    for i in 0..embedded.len() {
        let mut best_dist = f64::MAX;
        let mut best_j = None;
        for j in 0..embedded.len() {
            if (i as isize - j as isize).unsigned_abs() < min_separation {
                continue;
            }
            let dist = euclidean_distance(&embedded[i], &embedded[j]);
            if dist < best_dist && dist > f64::EPSILON {
                best_dist = dist;
                best_j = Some(j);
            }
        }
        if let Some(j) = best_j {
            let next_i = i + 1;
            let next_j = j + 1;
            if next_i < embedded.len() && next_j < embedded.len() {
                let evolved = euclidean_distance(&embedded[next_i], &embedded[next_j]);
                if evolved > f64::EPSILON {
                    log_divergences.push((evolved / best_dist).ln());
                }
            }
        }
    }

    if log_divergences.is_empty() {
        f64::NAN
    } else {
        log_divergences.iter().sum::<f64>() / log_divergences.len() as f64
    }
}

/// Higuchi's fractal dimension for `k_max` time-lag scales.
fn higuchi_fractal_dimension(series: &[f64], k_max: usize) -> f64 {
    let n = series.len();
    let mut log_k = Vec::new();
    let mut log_lk = Vec::new();

    for k in 1..=k_max.min(n / 2).max(1) {
        let mut lengths = Vec::new();
        for m in 0..k {
            let mut length = 0.0;
            let mut count = 0usize;
            let mut idx = m;
            while idx + k < n {
                length += (series[idx + k] - series[idx]).abs();
                count += 1;
                idx += k;
            }
            if count > 0 {
                let normalized = (length * (n as f64 - 1.0)) / (count as f64 * k as f64);
                lengths.push(normalized);
            }
        }
        if !lengths.is_empty() {
            let avg = lengths.iter().sum::<f64>() / lengths.len() as f64;
            if avg > f64::EPSILON {
                log_k.push((1.0 / k as f64).ln());
                log_lk.push(avg.ln());
            }
        }
    }

    linear_regression_slope(&log_k, &log_lk)
}

/// Permutation entropy (Bandt-Pompe ordinal patterns), order `m`, delay 1,
/// normalized to [0, 1] by dividing by ln(m!).
pub fn permutation_entropy(series: &[f64], m: usize) -> f64 {
    let patterns = ordinal_pattern_counts(series, m);
    if patterns.is_empty() {
        return f64::NAN;
    }
    let total: usize = patterns.values().sum();
    let max_entropy = factorial(m) as f64;
    let entropy = -patterns
        .values()
        .map(|&c| {
            let p = c as f64 / total as f64;
            p * p.ln()
        })
        .sum::<f64>();
    entropy / max_entropy.ln().max(f64::EPSILON)
}

fn ordinal_pattern_counts(series: &[f64], m: usize) -> std::collections::HashMap<Vec<usize>, usize> {
    let mut counts = std::collections::HashMap::new();
    if series.len() < m + 1 {
        return counts;
    }
    for window in series.windows(m) {
        let mut indexed: Vec<(usize, f64)> = window.iter().copied().enumerate().collect();
        indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        let pattern: Vec<usize> = indexed.iter().map(|(idx, _)| *idx).collect();
        *counts.entry(pattern).or_insert(0) += 1;
    }
    counts
}

fn factorial(n: usize) -> u64 {
    (1..=n as u64).product::<u64>().max(1)
}

/// Sample entropy (SampEn) with tolerance `r` expressed as a fraction of the
/// series' standard deviation, embedding dimension `m`.
pub fn sample_entropy(series: &[f64], m: usize, r_frac: f64) -> f64 {
    let n = series.len();
    if n <= m + 1 {
        return f64::NAN;
    }
    let r = r_frac * std_dev(series);
    if r <= f64::EPSILON {
        return f64::NAN;
    }

    let count_matches = |len: usize| -> f64 {
        let templates: Vec<&[f64]> = (0..=n - len).map(|i| &series[i..i + len]).collect();
        let mut matches = 0usize;
        for i in 0..templates.len() {
            for j in (i + 1)..templates.len() {
                let max_diff = templates[i]
                    .iter()
                    .zip(templates[j].iter())
                    .fold(0.0_f64, |acc, (a, b)| acc.max((a - b).abs()));
                if max_diff <= r {
                    matches += 1;
                }
            }
        }
        matches as f64
    };

    let b = count_matches(m);
    let a = count_matches(m + 1);
    if b <= f64::EPSILON || a <= f64::EPSILON {
        f64::NAN
    } else {
        -(a / b).ln()
    }
}

fn std_dev(series: &[f64]) -> f64 {
    let n = series.len() as f64;
    if n < 2.0 {
        return 0.0;
    }
    let mean = series.iter().sum::<f64>() / n;
    (series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt()
}

fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}

/// Ordinary least squares slope of `y` against `x`.
fn linear_regression_slope(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 || n != y.len() {
        return f64::NAN;
    }
    let n_f = n as f64;
    let mean_x = x.iter().sum::<f64>() / n_f;
    let mean_y = y.iter().sum::<f64>() / n_f;

    let mut num = 0.0;
    let mut den = 0.0;
    for i in 0..n {
        num += (x[i] - mean_x) * (y[i] - mean_y);
        den += (x[i] - mean_x).powi(2);
    }
    if den.abs() < f64::EPSILON {
        f64::NAN
    } else {
        num / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_walk(n: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        let mut value = 1.0;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                let unit = ((state >> 33) as f64) / (u32::MAX as f64) - 0.5;
                value += unit * 0.001;
                value
            })
            .collect()
    }

    #[test]
    fn below_threshold_is_all_nan() {
        let feats = chaos_features(&[1.0; 10]);
        assert!(feats.hurst_exponent.is_nan());
    }

    #[test]
    fn random_walk_produces_finite_features() {
        let series = random_walk(200, 42);
        let feats = chaos_features(&series);
        assert!(feats.hurst_exponent.is_finite());
        assert!(feats.dfa_alpha.is_finite());
        assert!(feats.higuchi_fd.is_finite());
        assert!(feats.permutation_entropy >= 0.0 && feats.permutation_entropy <= 1.0001);
    }

    #[test]
    fn constant_series_has_zero_permutation_entropy_input_is_degenerate() {
        let series = vec![1.0; 50];
        // Every ordinal pattern is identical (indices stay in place), so
        // entropy collapses to zero.
        let pe = permutation_entropy(&series, 3);
        assert!((pe).abs() < 1e-9);
    }
}
