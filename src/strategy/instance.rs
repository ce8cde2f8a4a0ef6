//! A materialized strategy: a signal generator bound to concrete parameters,
//! a risk block to backtest it with, and a deterministic composite name.

use crate::config::{CooldownMinutes, LotSize, MaxTradesPerDay, PipDistance};
use crate::domain::CandleTable;
use crate::strategy::invariants::enforce_invariants;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Stop/target/lot block a strategy instance is backtested with. Kept
/// alongside the signal parameters rather than drawn from the label grid —
/// the two grids serve different purposes (label grid explores the full
/// outcome space per candle; this one is the live risk block the factory's
/// risk-reward filter screens).
#[derive(Debug, Clone)]
pub struct RiskParams {
    pub stop_pips: PipDistance,
    pub target_pips: PipDistance,
    pub lot_size: LotSize,
}

impl RiskParams {
    pub fn risk_reward(&self) -> f64 {
        *self.target_pips / *self.stop_pips
    }
}

#[derive(Clone)]
pub struct StrategyInstance {
    pub template: &'static str,
    pub parameters: BTreeMap<String, f64>,
    pub risk: RiskParams,
    pub name: String,
    generator: Arc<dyn Fn(&CandleTable) -> Vec<i8> + Send + Sync>,
}

impl StrategyInstance {
    pub fn new(
        template: &'static str,
        parameters: BTreeMap<String, f64>,
        risk: RiskParams,
        generator: Arc<dyn Fn(&CandleTable) -> Vec<i8> + Send + Sync>,
    ) -> Self {
        let name = deterministic_name(template, &parameters, &risk);
        Self {
            template,
            parameters,
            risk,
            name,
            generator,
        }
    }

    /// Raw signal before the shared invariants are applied.
    pub fn raw_signal(&self, candles: &CandleTable) -> Vec<i8> {
        (self.generator)(candles)
    }

    /// Final signal series, with cooldown and daily-cap invariants enforced.
    pub fn signal(&self, candles: &CandleTable, cooldown: CooldownMinutes, max_trades_per_day: MaxTradesPerDay) -> Vec<i8> {
        let raw = self.raw_signal(candles);
        enforce_invariants(&raw, &candles.t_open_ns, cooldown.0, max_trades_per_day.0)
    }
}

fn deterministic_name(template: &str, parameters: &BTreeMap<String, f64>, risk: &RiskParams) -> String {
    let mut name = template.to_string();
    for (key, value) in parameters {
        name.push('_');
        name.push_str(&format!("{key}{value:.2}"));
    }
    name.push_str(&format!("_S{:.1}_TP{:.1}_LOT{:.2}", *risk.stop_pips, *risk.target_pips, *risk.lot_size));
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_deterministic_given_the_same_parameters() {
        let mut params = BTreeMap::new();
        params.insert("L".to_string(), 20.0);
        params.insert("T".to_string(), 2.0);
        let risk = RiskParams {
            stop_pips: PipDistance::new(10.0),
            target_pips: PipDistance::new(20.0),
            lot_size: LotSize::new(0.1),
        };
        let a = deterministic_name("mean_reversion", &params, &risk);
        let b = deterministic_name("mean_reversion", &params, &risk);
        assert_eq!(a, b);
        assert!(a.starts_with("mean_reversion_"));
    }

    #[test]
    fn risk_reward_divides_target_by_stop() {
        let risk = RiskParams {
            stop_pips: PipDistance::new(10.0),
            target_pips: PipDistance::new(25.0),
            lot_size: LotSize::new(0.1),
        };
        assert!((risk.risk_reward() - 2.5).abs() < 1e-9);
    }
}
