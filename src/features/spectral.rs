//! Spectral features over a window of (detrended) returns. The corpus
//! carries no FFT crate, so this hand-rolls a direct O(n^2) DFT — acceptable
//! since feature windows are small (tens to low hundreds of samples) and the
//! point is spectral shape, not throughput.

pub const MIN_SAMPLES_SPECTRAL: usize = 16;

#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralFeatures {
    pub dominant_freq: f64,
    pub spectral_entropy: f64,
    pub spectral_centroid: f64,
    pub wavelet_energy_hi: f64,
    pub wavelet_energy_lo: f64,
}

fn nan_features() -> SpectralFeatures {
    SpectralFeatures {
        dominant_freq: f64::NAN,
        spectral_entropy: f64::NAN,
        spectral_centroid: f64::NAN,
        wavelet_energy_hi: f64::NAN,
        wavelet_energy_lo: f64::NAN,
    }
}

/// Direct DFT power spectrum, bins `0..=n/2` (real-input symmetry).
fn power_spectrum(signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    let half = n / 2;
    let mut power = Vec::with_capacity(half + 1);

    for k in 0..=half {
        let mut re = 0.0;
        let mut im = 0.0;
        for (t, &x) in signal.iter().enumerate() {
            let angle = -2.0 * std::f64::consts::PI * (k as f64) * (t as f64) / (n as f64);
            re += x * angle.cos();
            im += x * angle.sin();
        }
        power.push(re * re + im * im);
    }
    power
}

/// A two-level Haar wavelet energy split: high-frequency (odd differences)
/// vs low-frequency (even averages), normalized to fractions of total
/// energy — a compact stand-in for a full wavelet energy pyramid.
fn haar_energy_split(signal: &[f64]) -> (f64, f64) {
    let n = signal.len();
    let pairs = n / 2;
    if pairs == 0 {
        return (f64::NAN, f64::NAN);
    }

    let mut hi_energy = 0.0;
    let mut lo_energy = 0.0;
    for i in 0..pairs {
        let a = signal[2 * i];
        let b = signal[2 * i + 1];
        let detail = (a - b) / std::f64::consts::SQRT_2;
        let approx = (a + b) / std::f64::consts::SQRT_2;
        hi_energy += detail * detail;
        lo_energy += approx * approx;
    }

    let total = hi_energy + lo_energy;
    if total > f64::EPSILON {
        (hi_energy / total, lo_energy / total)
    } else {
        (0.0, 0.0)
    }
}

/// Extracts spectral features from a window of mid prices. Internally
/// detrends via first differences before taking the DFT, so the spectrum
/// reflects price changes rather than the (usually dominant) DC level.
pub fn spectral_features(window: &[f64]) -> SpectralFeatures {
    if window.len() < MIN_SAMPLES_SPECTRAL {
        return nan_features();
    }

    let returns: Vec<f64> = window.windows(2).map(|w| w[1] - w[0]).collect();
    let power = power_spectrum(&returns);

    // Skip bin 0 (DC) when hunting for the dominant oscillation.
    let dominant_bin = power
        .iter()
        .enumerate()
        .skip(1)
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    let dominant_freq = dominant_bin as f64 / returns.len() as f64;

    let total_power: f64 = power.iter().sum();
    let spectral_entropy = if total_power > f64::EPSILON {
        -power
            .iter()
            .map(|&p| {
                let prob = p / total_power;
                if prob > f64::EPSILON {
                    prob * prob.ln()
                } else {
                    0.0
                }
            })
            .sum::<f64>()
            / (power.len() as f64).ln().max(f64::EPSILON)
    } else {
        0.0
    };

    let spectral_centroid = if total_power > f64::EPSILON {
        power
            .iter()
            .enumerate()
            .map(|(k, &p)| k as f64 * p)
            .sum::<f64>()
            / total_power
    } else {
        0.0
    };

    let (wavelet_energy_hi, wavelet_energy_lo) = haar_energy_split(&returns);

    SpectralFeatures {
        dominant_freq,
        spectral_entropy,
        spectral_centroid,
        wavelet_energy_hi,
        wavelet_energy_lo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_is_all_nan() {
        let short: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let feats = spectral_features(&short);
        assert!(feats.dominant_freq.is_nan());
    }

    #[test]
    fn pure_sine_has_concentrated_dominant_frequency() {
        let n = 64;
        let signal: Vec<f64> = (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * 4.0 * i as f64 / n as f64).sin())
            .collect();
        let feats = spectral_features(&signal);
        assert!(feats.dominant_freq > 0.0);
        assert!(feats.spectral_entropy >= 0.0 && feats.spectral_entropy <= 1.0001);
    }

    #[test]
    fn wavelet_energy_fractions_sum_to_one() {
        let signal: Vec<f64> = (0..32).map(|i| (i as f64 * 0.3).sin()).collect();
        let feats = spectral_features(&signal);
        assert!((feats.wavelet_energy_hi + feats.wavelet_energy_lo - 1.0).abs() < 1e-9);
    }
}
