//! Component G: the strategy backtester. Replays a strategy's signal series
//! bar by bar against a candle table and reports the trade list plus the
//! full performance-metrics suite.

pub mod metrics;
pub mod params;
pub mod simulator;
pub mod trade;

pub use metrics::{compute_metrics, BacktestMetrics};
pub use params::BacktestParams;
pub use simulator::{run_backtest, BacktestRun};
pub use trade::{ExitReason, Trade};

use crate::config::{CooldownMinutes, MaxTradesPerDay};

/// One strategy instance evaluated end to end: signal generation, simulation,
/// and metrics in a single call. The instance's own risk block (stop, target,
/// lot — the thing the factory's risk grid actually varies per instance)
/// overrides whatever `params` carries for those three fields; everything
/// else (pip size, commission, spread, capital) comes from `params` as-is.
pub fn backtest_strategy(
    candles: &crate::domain::CandleTable,
    instance: &crate::strategy::StrategyInstance,
    cooldown: CooldownMinutes,
    max_trades_per_day: MaxTradesPerDay,
    params: &BacktestParams,
) -> (BacktestRun, BacktestMetrics) {
    let signal = instance.signal(candles, cooldown, max_trades_per_day);
    let instance_params = BacktestParams {
        stop_loss_pips: instance.risk.stop_pips,
        take_profit_pips: instance.risk.target_pips,
        lot_size: instance.risk.lot_size,
        ..params.clone()
    };
    let run = run_backtest(candles, &signal, &instance_params);
    let metrics = compute_metrics(&run.trades, &run.equity_curve, instance_params.initial_capital, run.elapsed_days);
    (run, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Candle, CandleTable};
    use crate::strategy::{RiskParams, StrategyInstance};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    #[test]
    fn an_always_flat_strategy_produces_the_zero_trade_boundary_metrics() {
        let mut candles = CandleTable::default();
        for i in 0..20 {
            candles.push(Candle::new((i as i64) * 60_000_000_000, 1.1, 1.1, 1.1, 1.1, 1));
        }
        let instance = StrategyInstance::new(
            "flat",
            BTreeMap::new(),
            RiskParams {
                stop_pips: crate::config::PipDistance::new(20.0),
                target_pips: crate::config::PipDistance::new(30.0),
                lot_size: crate::config::LotSize::new(0.1),
            },
            Arc::new(|candles: &CandleTable| vec![0i8; candles.len()]),
        );
        let params = BacktestParams::default();
        let (run, metrics) = backtest_strategy(&candles, &instance, CooldownMinutes(15), MaxTradesPerDay(6), &params);
        assert!(run.trades.is_empty());
        assert_eq!(metrics.profit_factor, 1.0);
    }

    #[test]
    fn the_instances_own_risk_block_overrides_the_shared_backtest_params() {
        let mut candles = CandleTable::default();
        for i in 0..20 {
            candles.push(Candle::new((i as i64) * 60_000_000_000, 1.1, 1.1, 1.1, 1.1, 1));
        }
        let instance = StrategyInstance::new(
            "flat",
            BTreeMap::new(),
            RiskParams {
                stop_pips: crate::config::PipDistance::new(5.0),
                target_pips: crate::config::PipDistance::new(99.0),
                lot_size: crate::config::LotSize::new(0.3),
            },
            Arc::new(|candles: &CandleTable| vec![1i8, 0][..].iter().cycle().take(candles.len()).copied().collect()),
        );
        // `params` deliberately carries different risk than the instance.
        let params = BacktestParams { stop_loss_pips: crate::config::PipDistance::new(20.0), take_profit_pips: crate::config::PipDistance::new(30.0), lot_size: crate::config::LotSize::new(0.1), ..BacktestParams::default() };
        let (run, _metrics) = backtest_strategy(&candles, &instance, CooldownMinutes(0), MaxTradesPerDay(100), &params);
        if let Some(trade) = run.trades.first() {
            assert!((trade.lot_size - 0.3).abs() < 1e-9);
        }
    }
}
