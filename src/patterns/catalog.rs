//! Aggregates labeled candles into the pattern catalog: for every (regime,
//! movement level, direction) bucket, the top-K candle-shape signatures by
//! occurrence count plus feature statistics, and a global feature-importance
//! ranking against a chosen label target.

use crate::domain::CandleTable;
use crate::features::{compute_feature_importance, FeatureImportance, FeatureRow, FEATURE_NAMES};
use crate::labeling::Direction;
use crate::patterns::movement::MovementLevel;
use crate::patterns::signature::candle_signature;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TOP_K: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeatureStat {
    pub mean: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRecord {
    pub signature: String,
    pub count: usize,
    pub feature_stats: BTreeMap<String, FeatureStat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDirectionSummary {
    pub total_occurrences: usize,
    pub unique_patterns: usize,
    pub top_patterns: Vec<PatternRecord>,
    pub feature_stats: BTreeMap<String, FeatureStat>,
}

/// Keyed `regime_id -> movement_level -> direction -> summary`, per
/// spec.md 4.E's aggregation key; the JSON example in the spec collapses
/// the outer `regime_id` layer for brevity but the body text names all
/// three keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternCatalog {
    pub by_regime: BTreeMap<u32, BTreeMap<MovementLevel, BTreeMap<Direction, LevelDirectionSummary>>>,
    pub feature_importance: Option<FeatureImportance>,
}

/// Everything the miner needs: parallel arrays over the same candle range.
/// `targets` is the regression target for feature importance — typically a
/// chosen label column's `r_multiple` series.
pub struct MiningInput<'a> {
    pub candles: &'a CandleTable,
    pub features: &'a [FeatureRow],
    pub regime_id: &'a [u32],
    pub targets: &'a [f64],
    pub pip_size: f64,
}

/// Mines the full pattern catalog from a labeled, featurized, regime-tagged
/// candle table. `Direction::Long` tags an up close-to-close move,
/// `Direction::Short` a down move — reusing the label-side direction enum
/// rather than introducing a parallel one for "candle moved up/down".
pub fn mine_patterns(input: &MiningInput) -> PatternCatalog {
    let n = input.candles.len();
    let mut buckets: BTreeMap<u32, BTreeMap<MovementLevel, BTreeMap<Direction, Vec<usize>>>> = BTreeMap::new();

    for idx in 0..n {
        let candle = input.candles.get(idx);
        let move_pips = (candle.close - candle.open) / input.pip_size;
        let Some(level) = MovementLevel::classify(move_pips.abs()) else {
            continue;
        };
        let direction = if move_pips >= 0.0 { Direction::Long } else { Direction::Short };
        let regime = input.regime_id[idx];

        buckets
            .entry(regime)
            .or_default()
            .entry(level)
            .or_default()
            .entry(direction)
            .or_default()
            .push(idx);
    }

    let by_regime = buckets
        .into_iter()
        .map(|(regime, by_level)| {
            let level_map = by_level
                .into_iter()
                .map(|(level, by_direction)| {
                    let direction_map = by_direction
                        .into_iter()
                        .map(|(direction, indices)| {
                            (direction, summarize_bucket(input.candles, input.features, input.pip_size, &indices))
                        })
                        .collect();
                    (level, direction_map)
                })
                .collect();
            (regime, level_map)
        })
        .collect();

    PatternCatalog {
        by_regime,
        feature_importance: build_feature_importance(input).ok(),
    }
}

fn summarize_bucket(
    candles: &CandleTable,
    features: &[FeatureRow],
    pip_size: f64,
    indices: &[usize],
) -> LevelDirectionSummary {
    let mut by_signature: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for &idx in indices {
        let candle = candles.get(idx);
        let sig = candle_signature(&candle, pip_size);
        by_signature.entry(sig).or_default().push(idx);
    }

    let mut top_patterns: Vec<PatternRecord> = by_signature
        .into_iter()
        .map(|(signature, rows)| {
            let count = rows.len();
            let feature_stats = feature_stats_for(features, &rows);
            PatternRecord {
                signature,
                count,
                feature_stats,
            }
        })
        .collect();
    top_patterns.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.signature.cmp(&b.signature)));
    let unique_patterns = top_patterns.len();
    top_patterns.truncate(TOP_K);

    LevelDirectionSummary {
        total_occurrences: indices.len(),
        unique_patterns,
        top_patterns,
        feature_stats: feature_stats_for(features, indices),
    }
}

fn feature_stats_for(features: &[FeatureRow], indices: &[usize]) -> BTreeMap<String, FeatureStat> {
    let mut out = BTreeMap::new();
    for (col, &name) in FEATURE_NAMES.iter().enumerate() {
        let values: Vec<f64> = indices
            .iter()
            .map(|&i| features[i].values[col])
            .filter(|v| v.is_finite())
            .collect();
        if values.is_empty() {
            out.insert(
                name.to_string(),
                FeatureStat {
                    mean: f64::NAN,
                    std_dev: f64::NAN,
                },
            );
            continue;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        out.insert(
            name.to_string(),
            FeatureStat {
                mean,
                std_dev: var.sqrt(),
            },
        );
    }
    out
}

fn build_feature_importance(input: &MiningInput) -> anyhow::Result<FeatureImportance> {
    let (rows, targets): (Vec<Vec<f64>>, Vec<f64>) = input
        .features
        .iter()
        .zip(input.targets.iter())
        .filter(|(f, t)| f.values.iter().all(|v| v.is_finite()) && t.is_finite())
        .map(|(f, &t)| (f.values.to_vec(), t))
        .unzip();

    compute_feature_importance(&rows, &targets, FEATURE_NAMES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Candle, Universe};

    fn sample_candles(n: usize) -> CandleTable {
        let mut table = CandleTable::with_universe(Universe::new(5, 20));
        for i in 0..n {
            let trend = i as f64 * 0.0006;
            let base = 1.1000 + trend;
            table.push(Candle::new(i as i64 * 300_000_000_000, base, base + 0.0009, base - 0.0002, base + 0.0006, 4));
        }
        table
    }

    fn feature_row(values: [f64; 3]) -> FeatureRow {
        let mut full = [0.0; FEATURE_NAMES.len()];
        full[..3].copy_from_slice(&values);
        FeatureRow { values: full }
    }

    #[test]
    fn every_up_candle_lands_in_the_long_bucket() {
        let candles = sample_candles(20);
        let features: Vec<FeatureRow> = (0..20).map(|i| feature_row([i as f64, 0.0, 0.0])).collect();
        let regime_id = vec![0u32; 20];
        let targets: Vec<f64> = (0..20).map(|i| i as f64 * 0.1).collect();

        let input = MiningInput {
            candles: &candles,
            features: &features,
            regime_id: &regime_id,
            targets: &targets,
            pip_size: 1e-4,
        };
        let catalog = mine_patterns(&input);

        let regime_zero = catalog.by_regime.get(&0).expect("regime 0 present");
        let has_long = regime_zero.values().any(|by_dir| by_dir.contains_key(&Direction::Long));
        assert!(has_long);
        assert!(!regime_zero.values().any(|by_dir| by_dir.contains_key(&Direction::Short)));
    }

    #[test]
    fn top_patterns_are_sorted_by_count_descending() {
        let candles = sample_candles(20);
        let features: Vec<FeatureRow> = (0..20).map(|i| feature_row([i as f64, 0.0, 0.0])).collect();
        let regime_id = vec![0u32; 20];
        let targets: Vec<f64> = (0..20).map(|i| i as f64 * 0.1).collect();

        let input = MiningInput {
            candles: &candles,
            features: &features,
            regime_id: &regime_id,
            targets: &targets,
            pip_size: 1e-4,
        };
        let catalog = mine_patterns(&input);

        for by_level in catalog.by_regime.values() {
            for by_direction in by_level.values() {
                for summary in by_direction.values() {
                    let counts: Vec<usize> = summary.top_patterns.iter().map(|p| p.count).collect();
                    let mut sorted = counts.clone();
                    sorted.sort_by(|a, b| b.cmp(a));
                    assert_eq!(counts, sorted);
                }
            }
        }
    }
}
