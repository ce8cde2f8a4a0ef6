//! The regime detector (component D): standardizes feature vectors, fits
//! K-means over a searched K range, and summarizes each cluster.

pub mod kmeans_runner;
pub mod silhouette;

use crate::config::RegimeConfig;
use crate::features::FeatureRow;
use kmeans_runner::{search_best_k, KMeansResult};
use serde::{Deserialize, Serialize};

/// Sentinel for rows excluded from clustering because they carried a
/// non-finite feature value (insufficient warm-up window).
pub const UNASSIGNED: u32 = u32::MAX;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster_id: u32,
    pub count: usize,
    pub mean_features: Vec<f64>,
    pub dominant_regime_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeTable {
    pub k: usize,
    pub silhouette: f64,
    pub regime_id: Vec<u32>,
    pub summaries: Vec<ClusterSummary>,
}

/// Z-score standardizes every column over rows with all-finite values,
/// returning the standardized matrix alongside the original row indices it
/// covers. Rows with any NaN feature are dropped from clustering entirely;
/// their `regime_id` stays [`UNASSIGNED`].
fn standardize(rows: &[Vec<f64>]) -> (Vec<Vec<f64>>, Vec<usize>) {
    let dims = rows.first().map(|r| r.len()).unwrap_or(0);
    let kept_indices: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, r)| r.iter().all(|v| v.is_finite()))
        .map(|(i, _)| i)
        .collect();

    if kept_indices.is_empty() || dims == 0 {
        return (Vec::new(), Vec::new());
    }

    let n = kept_indices.len() as f64;
    let mut means = vec![0.0; dims];
    for &i in &kept_indices {
        for d in 0..dims {
            means[d] += rows[i][d];
        }
    }
    for m in means.iter_mut() {
        *m /= n;
    }

    let mut std_devs = vec![0.0; dims];
    for &i in &kept_indices {
        for d in 0..dims {
            std_devs[d] += (rows[i][d] - means[d]).powi(2);
        }
    }
    for s in std_devs.iter_mut() {
        *s = (*s / n).sqrt();
        if *s < 1e-12 {
            *s = 1.0;
        }
    }

    let standardized = kept_indices
        .iter()
        .map(|&i| (0..dims).map(|d| (rows[i][d] - means[d]) / std_devs[d]).collect())
        .collect();

    (standardized, kept_indices)
}

/// Clusters a table of feature rows into regimes. Returns a table with one
/// regime id per input row (or [`UNASSIGNED`] where the row had no finite
/// feature vector) plus a per-cluster summary.
pub fn detect_regimes(feature_rows: &[FeatureRow], config: &RegimeConfig, seed: u64) -> RegimeTable {
    let raw: Vec<Vec<f64>> = feature_rows.iter().map(|r| r.values.to_vec()).collect();
    let (standardized, kept_indices) = standardize(&raw);

    let mut regime_id = vec![UNASSIGNED; feature_rows.len()];

    let best = match search_best_k(&standardized, config.k_min, config.k_max, seed) {
        Some(b) => b,
        None => {
            return RegimeTable {
                k: 0,
                silhouette: f64::NAN,
                regime_id,
                summaries: Vec::new(),
            };
        }
    };

    for (local_idx, &orig_idx) in kept_indices.iter().enumerate() {
        regime_id[orig_idx] = best.labels[local_idx];
    }

    RegimeTable {
        k: best.k,
        silhouette: best.silhouette,
        summaries: summarize_clusters(&best),
        regime_id,
    }
}

const REGIME_NAMES: [&str; 6] = ["quiet", "calm", "mixed", "active", "volatile", "turbulent"];

/// Names clusters by the average absolute magnitude of their standardized
/// centroid, ascending — the cluster furthest from the overall mean (in
/// standardized units) is the most "turbulent" one.
fn summarize_clusters(best: &KMeansResult) -> Vec<ClusterSummary> {
    let dims = best.centroids.first().map(|c| c.len()).unwrap_or(0).max(1);

    let mut ranked: Vec<(usize, f64)> = best
        .centroids
        .iter()
        .enumerate()
        .map(|(idx, c)| (idx, c.iter().map(|v| v.abs()).sum::<f64>() / dims as f64))
        .collect();
    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut name_for_cluster = vec![String::new(); best.k];
    for (rank, (cluster_idx, _)) in ranked.iter().enumerate() {
        name_for_cluster[*cluster_idx] = REGIME_NAMES
            .get(rank)
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("regime_{rank}"));
    }

    (0..best.k)
        .map(|cluster_id| {
            let count = best.labels.iter().filter(|&&l| l as usize == cluster_id).count();
            ClusterSummary {
                cluster_id: cluster_id as u32,
                count,
                mean_features: best.centroids[cluster_id].clone(),
                dominant_regime_name: name_for_cluster[cluster_id].clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature_row(values: [f64; 3]) -> FeatureRow {
        let mut full = [0.0; crate::features::FEATURE_NAMES.len()];
        full[..3].copy_from_slice(&values);
        FeatureRow { values: full }
    }

    #[test]
    fn two_separated_blobs_produce_two_regimes_with_summaries() {
        let mut rows = Vec::new();
        for i in 0..15 {
            rows.push(feature_row([0.0 + i as f64 * 0.001, 0.0, 0.0]));
        }
        for i in 0..15 {
            rows.push(feature_row([20.0 + i as f64 * 0.001, 0.0, 0.0]));
        }

        let config = RegimeConfig { k_min: 2, k_max: 4 };
        let table = detect_regimes(&rows, &config, 3);

        assert_eq!(table.k, 2);
        assert_eq!(table.summaries.len(), 2);
        assert!(table.regime_id.iter().all(|&r| r != UNASSIGNED));
        assert_ne!(table.regime_id[0], table.regime_id[20]);
    }

    #[test]
    fn rows_with_nan_features_are_excluded_from_clustering() {
        let mut rows: Vec<FeatureRow> = (0..10).map(|i| feature_row([i as f64, 0.0, 0.0])).collect();
        rows.push(feature_row([f64::NAN, 0.0, 0.0]));

        let config = RegimeConfig::default();
        let table = detect_regimes(&rows, &config, 5);

        assert_eq!(table.regime_id[10], UNASSIGNED);
    }

    #[test]
    fn insufficient_rows_yields_empty_table_not_a_panic() {
        let rows = vec![feature_row([1.0, 2.0, 3.0])];
        let config = RegimeConfig::default();
        let table = detect_regimes(&rows, &config, 1);
        assert_eq!(table.k, 0);
        assert!(table.silhouette.is_nan());
    }
}
