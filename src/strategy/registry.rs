//! Enumerates the template registry × parameter grid × risk grid, filtering
//! by the configured minimum risk-reward, and materializes `StrategyInstance`
//! values with deterministic composite names.

use crate::config::{PipDistance, StrategyConstraints};
use crate::strategy::instance::{RiskParams, StrategyInstance};
use crate::strategy::templates::{breakout_signal, mean_reversion_signal, momentum_burst_signal, trend_follower_signal};
use itertools::iproduct;
use std::collections::BTreeMap;
use std::sync::Arc;

fn risk_grid() -> Vec<RiskParams> {
    let stops = [10.0, 20.0];
    let targets = [15.0, 30.0];
    let lots = [0.1, 0.5];

    iproduct!(stops, targets, lots)
        .map(|(stop, target, lot)| RiskParams {
            stop_pips: PipDistance::new(stop),
            target_pips: PipDistance::new(target),
            lot_size: crate::config::LotSize::new(lot),
        })
        .collect()
}

fn params(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Builds every strategy instance across the four required templates, the
/// template's own signal-parameter grid, and the shared risk grid —
/// dropping any (template params, risk) combination whose risk-reward
/// falls below `constraints.min_risk_reward`.
pub fn enumerate_strategies(constraints: &StrategyConstraints) -> Vec<StrategyInstance> {
    let risks = risk_grid();
    let mut instances = Vec::new();

    for lookback in [20usize, 60] {
        for threshold_std in [1.5, 2.0, 2.5] {
            for risk in &risks {
                if risk.risk_reward() < constraints.min_risk_reward {
                    continue;
                }
                instances.push(StrategyInstance::new(
                    "mean_reversion",
                    params(&[("L", lookback as f64), ("T", threshold_std)]),
                    risk.clone(),
                    Arc::new(move |candles| mean_reversion_signal(candles, lookback, threshold_std)),
                ));
            }
        }
    }

    for lookback in [10usize, 20] {
        for threshold_std in [1.5, 2.0] {
            for risk in &risks {
                if risk.risk_reward() < constraints.min_risk_reward {
                    continue;
                }
                instances.push(StrategyInstance::new(
                    "momentum_burst",
                    params(&[("L", lookback as f64), ("T", threshold_std)]),
                    risk.clone(),
                    Arc::new(move |candles| momentum_burst_signal(candles, lookback, threshold_std)),
                ));
            }
        }
    }

    for lookback in [20usize, 55] {
        for risk in &risks {
            if risk.risk_reward() < constraints.min_risk_reward {
                continue;
            }
            instances.push(StrategyInstance::new(
                "breakout",
                params(&[("L", lookback as f64)]),
                risk.clone(),
                Arc::new(move |candles| breakout_signal(candles, lookback)),
            ));
        }
    }

    for lookback in [20usize, 60, 120] {
        for risk in &risks {
            if risk.risk_reward() < constraints.min_risk_reward {
                continue;
            }
            instances.push(StrategyInstance::new(
                "trend_follower",
                params(&[("L", lookback as f64)]),
                risk.clone(),
                Arc::new(move |candles| trend_follower_signal(candles, lookback)),
            ));
        }
    }

    instances
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_instance_meets_the_minimum_risk_reward() {
        let constraints = StrategyConstraints {
            min_risk_reward: 1.3,
            ..Default::default()
        };
        let instances = enumerate_strategies(&constraints);
        assert!(!instances.is_empty());
        for inst in &instances {
            assert!(inst.risk.risk_reward() >= 1.3, "{} violates risk-reward floor", inst.name);
        }
    }

    #[test]
    fn all_four_required_templates_are_represented() {
        let constraints = StrategyConstraints::default();
        let instances = enumerate_strategies(&constraints);
        let templates: std::collections::HashSet<&str> = instances.iter().map(|i| i.template).collect();
        for required in ["mean_reversion", "momentum_burst", "breakout", "trend_follower"] {
            assert!(templates.contains(required), "missing template {required}");
        }
    }

    #[test]
    fn names_are_unique_across_the_whole_registry() {
        let instances = enumerate_strategies(&StrategyConstraints::default());
        let names: std::collections::HashSet<&str> = instances.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names.len(), instances.len());
    }
}
