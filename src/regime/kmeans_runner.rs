//! Lloyd's-algorithm K-means with a deterministic (seeded, RNG-crate-free)
//! k-means++ initialization, searched over a range of K and selected by
//! silhouette score.

use crate::regime::silhouette::silhouette_score;

const MAX_ITERS: usize = 100;

#[derive(Debug, Clone)]
pub struct KMeansResult {
    pub k: usize,
    pub labels: Vec<u32>,
    pub centroids: Vec<Vec<f64>>,
    pub silhouette: f64,
}

/// Deterministic xorshift64 PRNG — avoids pulling in a dependency purely for
/// a one-off seeded initialization.
struct Xorshift64(u64);

impl Xorshift64 {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn kmeans_plus_plus_init(rows: &[Vec<f64>], k: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = Xorshift64::new(seed);
    let mut centroids = Vec::with_capacity(k);

    let first_idx = (rng.next_u64() as usize) % rows.len();
    centroids.push(rows[first_idx].clone());

    while centroids.len() < k {
        let weights: Vec<f64> = rows
            .iter()
            .map(|row| {
                centroids
                    .iter()
                    .map(|c| squared_distance(row, c))
                    .fold(f64::MAX, f64::min)
            })
            .collect();
        let total: f64 = weights.iter().sum();
        if total <= f64::EPSILON {
            centroids.push(rows[(rng.next_u64() as usize) % rows.len()].clone());
            continue;
        }
        let target = rng.next_f64() * total;
        let mut cumulative = 0.0;
        let mut chosen = rows.len() - 1;
        for (idx, &w) in weights.iter().enumerate() {
            cumulative += w;
            if cumulative >= target {
                chosen = idx;
                break;
            }
        }
        centroids.push(rows[chosen].clone());
    }

    centroids
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Runs Lloyd's algorithm to convergence (or `MAX_ITERS`), returning final
/// cluster assignments and centroids.
pub fn kmeans_fit(rows: &[Vec<f64>], k: usize, seed: u64) -> (Vec<u32>, Vec<Vec<f64>>) {
    let dims = rows[0].len();
    let mut centroids = kmeans_plus_plus_init(rows, k, seed);
    let mut labels = vec![0u32; rows.len()];

    for _ in 0..MAX_ITERS {
        let mut changed = false;
        for (i, row) in rows.iter().enumerate() {
            let best = centroids
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    squared_distance(row, a)
                        .partial_cmp(&squared_distance(row, b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(idx, _)| idx as u32)
                .unwrap_or(0);
            if labels[i] != best {
                labels[i] = best;
                changed = true;
            }
        }

        let mut sums = vec![vec![0.0; dims]; k];
        let mut counts = vec![0usize; k];
        for (row, &label) in rows.iter().zip(labels.iter()) {
            let c = label as usize;
            counts[c] += 1;
            for d in 0..dims {
                sums[c][d] += row[d];
            }
        }
        for c in 0..k {
            if counts[c] > 0 {
                for d in 0..dims {
                    centroids[c][d] = sums[c][d] / counts[c] as f64;
                }
            }
        }

        if !changed {
            break;
        }
    }

    (labels, centroids)
}

/// Searches `k_min..=k_max`, fitting K-means for each and scoring by
/// silhouette. Returns the best-scoring fit. Rows with any non-finite value
/// must be filtered out by the caller before calling this.
pub fn search_best_k(rows: &[Vec<f64>], k_min: usize, k_max: usize, seed: u64) -> Option<KMeansResult> {
    if rows.len() < k_min.max(2) {
        return None;
    }

    (k_min.max(2)..=k_max.min(rows.len()))
        .filter_map(|k| {
            let (labels, centroids) = kmeans_fit(rows, k, seed.wrapping_add(k as u64));
            let silhouette = silhouette_score(rows, &labels);
            if silhouette.is_nan() {
                None
            } else {
                Some(KMeansResult {
                    k,
                    labels,
                    centroids,
                    silhouette,
                })
            }
        })
        .max_by(|a, b| a.silhouette.partial_cmp(&b.silhouette).unwrap_or(std::cmp::Ordering::Equal))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Vec<Vec<f64>> {
        let mut rows = Vec::new();
        for i in 0..15 {
            rows.push(vec![0.0 + (i as f64 * 0.01), 0.0 + (i as f64 * 0.01)]);
        }
        for i in 0..15 {
            rows.push(vec![10.0 + (i as f64 * 0.01), 10.0 + (i as f64 * 0.01)]);
        }
        rows
    }

    #[test]
    fn finds_two_well_separated_clusters() {
        let rows = two_blobs();
        let (labels, _) = kmeans_fit(&rows, 2, 7);
        let first_half: std::collections::HashSet<u32> = labels[0..15].iter().copied().collect();
        let second_half: std::collections::HashSet<u32> = labels[15..30].iter().copied().collect();
        assert_eq!(first_half.len(), 1);
        assert_eq!(second_half.len(), 1);
        assert_ne!(first_half, second_half);
    }

    #[test]
    fn search_best_k_prefers_two_over_six() {
        let rows = two_blobs();
        let best = search_best_k(&rows, 2, 6, 11).unwrap();
        assert_eq!(best.k, 2);
    }
}
