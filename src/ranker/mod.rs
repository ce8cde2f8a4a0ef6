//! Component H: composite multi-objective ranking over a population of
//! backtest results.

use crate::backtest::BacktestMetrics;
use crate::config::RankerWeights;
use crate::utils::{get_max, get_min};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One evaluated (strategy, lot size) row, carried in alongside the key the
/// ranker needs for same-strategy-different-lot dedup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankerRow {
    /// Full deterministic instance name (includes the lot size).
    pub instance_name: String,
    /// Strategy identity excluding lot size — rows sharing this key are the
    /// same strategy evaluated at different lot sizes.
    pub strategy_key: String,
    pub metrics: BacktestMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    pub instance_name: String,
    pub metrics: BacktestMetrics,
    pub score: f64,
}

/// Min-max scales `values` to `[0, 1]`. A constant population (max == min)
/// maps every value to `0.5` rather than dividing by zero or favoring the
/// first row seen. Min/max extraction goes through `utils::maths_utils`,
/// which wraps `argminmax` for SIMD-accelerated scans.
fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return vec![0.5; values.len()];
    }
    let min = get_min(&finite);
    let max = get_max(&finite);
    let span = max - min;
    values
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                0.0
            } else if span.abs() < f64::EPSILON {
                0.5
            } else {
                ((v - min) / span).clamp(0.0, 1.0)
            }
        })
        .collect()
}

/// Ranks a population of backtest results by the composite score defined in
/// the ranker's weight set. Rows with fewer than `min_trades` trades are
/// dropped before scoring. When multiple rows share a `strategy_key` (the
/// same strategy at different lot sizes), only the row with the highest
/// `total_return` survives. Output is sorted by score descending, ties
/// broken by `instance_name` so the ranking is stable across input
/// permutations.
pub fn rank_results(rows: &[RankerRow], weights: &RankerWeights, min_trades: u32) -> Vec<RankedResult> {
    let eligible: Vec<&RankerRow> = rows.iter().filter(|r| r.metrics.n_trades as u32 >= min_trades).collect();

    let mut best_per_strategy: HashMap<&str, &RankerRow> = HashMap::new();
    for row in &eligible {
        best_per_strategy
            .entry(row.strategy_key.as_str())
            .and_modify(|current| {
                if row.metrics.total_return > current.metrics.total_return {
                    *current = row;
                }
            })
            .or_insert(row);
    }

    let mut deduped: Vec<&RankerRow> = best_per_strategy.into_values().collect();
    deduped.sort_by(|a, b| a.instance_name.cmp(&b.instance_name));

    if deduped.is_empty() {
        return Vec::new();
    }

    let sharpe: Vec<f64> = deduped.iter().map(|r| r.metrics.sharpe).collect();
    let sortino: Vec<f64> = deduped.iter().map(|r| r.metrics.sortino).collect();
    let calmar: Vec<f64> = deduped.iter().map(|r| r.metrics.calmar).collect();
    let abs_drawdown: Vec<f64> = deduped.iter().map(|r| r.metrics.max_drawdown.abs()).collect();
    let ulcer: Vec<f64> = deduped.iter().map(|r| r.metrics.ulcer_index).collect();
    let win_rate: Vec<f64> = deduped.iter().map(|r| r.metrics.win_rate).collect();
    let profit_factor: Vec<f64> = deduped.iter().map(|r| r.metrics.profit_factor).collect();

    let norm_sharpe = min_max_normalize(&sharpe);
    let norm_sortino = min_max_normalize(&sortino);
    let norm_calmar = min_max_normalize(&calmar);
    let norm_drawdown = min_max_normalize(&abs_drawdown);
    let norm_ulcer = min_max_normalize(&ulcer);
    let norm_win_rate = min_max_normalize(&win_rate);
    let norm_profit_factor = min_max_normalize(&profit_factor);

    let mut ranked: Vec<RankedResult> = deduped
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let score = *weights.sharpe * norm_sharpe[i] + *weights.sortino * norm_sortino[i] + *weights.calmar * norm_calmar[i]
                - *weights.max_drawdown * norm_drawdown[i]
                - *weights.ulcer * norm_ulcer[i]
                + *weights.win_rate * norm_win_rate[i]
                + *weights.profit_factor * norm_profit_factor[i];
            RankedResult {
                instance_name: row.instance_name.clone(),
                metrics: row.metrics,
                score,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.instance_name.cmp(&b.instance_name)));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(sharpe: f64, total_return: f64, n_trades: usize) -> BacktestMetrics {
        BacktestMetrics {
            n_trades,
            win_rate: 0.5,
            profit_factor: 1.2,
            total_return,
            expectancy: 1.0,
            sharpe,
            sortino: sharpe,
            calmar: sharpe,
            ulcer_index: 0.1,
            max_drawdown: 0.1,
        }
    }

    #[test]
    fn rows_below_the_minimum_trade_count_are_dropped() {
        let rows = vec![RankerRow {
            instance_name: "a".to_string(),
            strategy_key: "a".to_string(),
            metrics: metrics(1.0, 0.1, 10),
        }];
        let ranked = rank_results(&rows, &RankerWeights::default(), 50);
        assert!(ranked.is_empty());
    }

    #[test]
    fn the_higher_total_return_lot_size_wins_within_a_strategy() {
        let rows = vec![
            RankerRow {
                instance_name: "strat_lot_small".to_string(),
                strategy_key: "strat".to_string(),
                metrics: metrics(1.0, 0.05, 100),
            },
            RankerRow {
                instance_name: "strat_lot_large".to_string(),
                strategy_key: "strat".to_string(),
                metrics: metrics(1.0, 0.25, 100),
            },
        ];
        let ranked = rank_results(&rows, &RankerWeights::default(), 50);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].instance_name, "strat_lot_large");
    }

    #[test]
    fn ranking_is_stable_across_input_permutations() {
        let rows_a = vec![
            RankerRow { instance_name: "x".to_string(), strategy_key: "x".to_string(), metrics: metrics(2.0, 0.3, 100) },
            RankerRow { instance_name: "y".to_string(), strategy_key: "y".to_string(), metrics: metrics(0.5, 0.1, 100) },
        ];
        let rows_b = vec![rows_a[1].clone(), rows_a[0].clone()];

        let ranked_a = rank_results(&rows_a, &RankerWeights::default(), 50);
        let ranked_b = rank_results(&rows_b, &RankerWeights::default(), 50);

        let names_a: Vec<_> = ranked_a.iter().map(|r| r.instance_name.clone()).collect();
        let names_b: Vec<_> = ranked_b.iter().map(|r| r.instance_name.clone()).collect();
        assert_eq!(names_a, names_b);
        assert_eq!(names_a[0], "x");
    }

    #[test]
    fn a_constant_population_normalizes_every_row_to_the_midpoint_without_panicking() {
        let values = vec![3.0, 3.0, 3.0];
        let normalized = min_max_normalize(&values);
        assert!(normalized.iter().all(|&v| (v - 0.5).abs() < 1e-12));
    }
}
