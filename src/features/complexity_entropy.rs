//! Complexity-entropy (Bandt-Pompe) plane coordinates: normalized
//! permutation entropy on one axis, Jensen-Shannon statistical complexity
//! (Lopez-Ruiz-Mancini-Calbet) on the other.

use std::collections::HashMap;

pub const MIN_SAMPLES_CE: usize = 30;

#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexityEntropy {
    pub entropy: f64,
    pub complexity: f64,
}

pub fn complexity_entropy_plane(series: &[f64], order: usize) -> ComplexityEntropy {
    if series.len() < MIN_SAMPLES_CE {
        return ComplexityEntropy {
            entropy: f64::NAN,
            complexity: f64::NAN,
        };
    }

    let counts = ordinal_distribution(series, order);
    let total: usize = counts.values().sum();
    if total == 0 {
        return ComplexityEntropy {
            entropy: f64::NAN,
            complexity: f64::NAN,
        };
    }

    let n_states = factorial(order) as f64;
    let probs: Vec<f64> = counts.values().map(|&c| c as f64 / total as f64).collect();

    let shannon = |p: &[f64]| -> f64 { -p.iter().filter(|&&x| x > 0.0).map(|&x| x * x.ln()).sum::<f64>() };

    let h_max = n_states.ln();
    let entropy = shannon(&probs) / h_max.max(f64::EPSILON);

    let uniform = 1.0 / n_states;
    // Jensen-Shannon divergence between the observed distribution (padded
    // with zero-probability unseen patterns) and the uniform distribution.
    let mut observed = vec![0.0; n_states as usize];
    for (i, &p) in probs.iter().enumerate() {
        observed[i] = p;
    }
    let mixture: Vec<f64> = observed.iter().map(|&p| 0.5 * (p + uniform)).collect();
    let h_uniform = n_states.ln();
    let js_div = shannon(&mixture) - 0.5 * shannon(&observed) - 0.5 * h_uniform;

    // Normalization constant Q0 from Lopez-Ruiz et al.
    let q0_denom = ((n_states + 1.0) / n_states) * (n_states + 1.0).ln() - 2.0 * (2.0 * n_states).ln()
        + n_states.ln();
    let q0 = if q0_denom.abs() > f64::EPSILON {
        -2.0 / q0_denom
    } else {
        1.0
    };

    let complexity = (q0 * js_div * entropy).abs();

    ComplexityEntropy { entropy, complexity }
}

fn ordinal_distribution(series: &[f64], order: usize) -> HashMap<Vec<usize>, usize> {
    let mut counts = HashMap::new();
    if series.len() < order + 1 {
        return counts;
    }
    for window in series.windows(order) {
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
