//! Full performance-metrics suite computed from a trade list and the
//! corresponding equity curve.

use crate::backtest::trade::Trade;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct BacktestMetrics {
    pub n_trades: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub total_return: f64,
    pub expectancy: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,
    pub ulcer_index: f64,
    pub max_drawdown: f64,
}

impl BacktestMetrics {
    /// The spec's explicit zero-trade boundary: every rate metric is zero,
    /// profit factor defaults to 1.0 (neither profitable nor unprofitable),
    /// never NaN or a division artifact.
    fn zero_trades() -> Self {
        Self {
            n_trades: 0,
            win_rate: 0.0,
            profit_factor: 1.0,
            total_return: 0.0,
            expectancy: 0.0,
            sharpe: 0.0,
            sortino: 0.0,
            calmar: 0.0,
            ulcer_index: 0.0,
            max_drawdown: 0.0,
        }
    }
}

/// `elapsed_days` is the real wall-clock span the equity curve covers
/// (derived from the candle table's timestamps), used to annualize total
/// return for Calmar. Sharpe/Sortino follow the trading-days convention
/// named in the spec: per-trade returns scaled by `sqrt(252)`.
pub fn compute_metrics(trades: &[Trade], equity_curve: &[f64], initial_capital: f64, elapsed_days: f64) -> BacktestMetrics {
    if trades.is_empty() {
        return BacktestMetrics::zero_trades();
    }

    let returns: Vec<f64> = trades.iter().map(|t| t.pnl_usd / initial_capital).collect();
    let n = returns.len() as f64;

    let wins = trades.iter().filter(|t| t.pnl_usd > 0.0).count();
    let win_rate = wins as f64 / n;

    let gross_profit: f64 = trades.iter().filter(|t| t.pnl_usd > 0.0).map(|t| t.pnl_usd).sum();
    let gross_loss: f64 = trades.iter().filter(|t| t.pnl_usd < 0.0).map(|t| t.pnl_usd.abs()).sum();
    let profit_factor = if gross_loss > f64::EPSILON {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        1.0
    };

    let total_pnl: f64 = trades.iter().map(|t| t.pnl_usd).sum();
    let total_return = total_pnl / initial_capital;
    let expectancy = total_pnl / n;

    let mean_return = returns.iter().sum::<f64>() / n;
    let std_return = (returns.iter().map(|r| (r - mean_return).powi(2)).sum::<f64>() / n).sqrt();
    let sharpe = if std_return > f64::EPSILON {
        (mean_return / std_return) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    let downside: Vec<f64> = returns.iter().filter(|&&r| r < 0.0).cloned().collect();
    let downside_dev = if downside.is_empty() {
        0.0
    } else {
        (downside.iter().map(|r| r.powi(2)).sum::<f64>() / downside.len() as f64).sqrt()
    };
    let sortino = if downside_dev > f64::EPSILON {
        (mean_return / downside_dev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    let (max_drawdown, ulcer_index) = drawdown_stats(equity_curve);

    let annualized_return = total_return * (365.25 / elapsed_days.max(1.0));
    let calmar = if max_drawdown.abs() > f64::EPSILON { annualized_return / max_drawdown.abs() } else { 0.0 };

    BacktestMetrics {
        n_trades: trades.len(),
        win_rate,
        profit_factor,
        total_return,
        expectancy,
        sharpe,
        sortino,
        calmar,
        ulcer_index,
        max_drawdown,
    }
}

/// Returns `(max_drawdown, ulcer_index)`, both against the running peak of
/// the equity curve. `max_drawdown` is a positive fraction of peak equity.
fn drawdown_stats(equity_curve: &[f64]) -> (f64, f64) {
    if equity_curve.is_empty() {
        return (0.0, 0.0);
    }

    let mut peak = equity_curve[0];
    let mut max_dd = 0.0;
    let mut squared_dd_sum = 0.0;

    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        }
        let dd = if peak > f64::EPSILON { (peak - equity) / peak } else { 0.0 };
        if dd > max_dd {
            max_dd = dd;
        }
        squared_dd_sum += dd * dd;
    }

    let ulcer_index = (squared_dd_sum / equity_curve.len() as f64).sqrt();
    (max_dd, ulcer_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtest::trade::ExitReason;
    use crate::labeling::Direction;

    fn trade(pnl_usd: f64) -> Trade {
        Trade {
            id: "t".to_string(),
            direction: Direction::Long,
            entry_idx: 0,
            exit_idx: 1,
            entry_price: 1.0,
            exit_price: 1.001,
            stop_price: 0.999,
            target_price: 1.002,
            exit_reason: ExitReason::Target,
            lot_size: 0.1,
            pnl_pips: 10.0,
            pnl_usd,
        }
    }

    #[test]
    fn zero_trades_hits_every_documented_boundary_value() {
        let metrics = compute_metrics(&[], &[], 10_000.0, 30.0);
        assert_eq!(metrics.n_trades, 0);
        assert_eq!(metrics.win_rate, 0.0);
        assert_eq!(metrics.profit_factor, 1.0);
        assert_eq!(metrics.sharpe, 0.0);
        assert_eq!(metrics.total_return, 0.0);
    }

    #[test]
    fn all_winning_trades_yield_an_infinite_profit_factor() {
        let trades = vec![trade(100.0), trade(50.0)];
        let equity_curve = vec![10_000.0, 10_100.0, 10_150.0];
        let metrics = compute_metrics(&trades, &equity_curve, 10_000.0, 10.0);
        assert!(metrics.profit_factor.is_infinite());
        assert!(metrics.max_drawdown.abs() < 1e-12);
    }

    #[test]
    fn a_drawdown_then_recovery_is_reflected_in_max_drawdown_and_ulcer() {
        let trades = vec![trade(-200.0), trade(50.0)];
        let equity_curve = vec![10_000.0, 9_800.0, 9_850.0];
        let metrics = compute_metrics(&trades, &equity_curve, 10_000.0, 10.0);
        assert!(metrics.max_drawdown > 0.0);
        assert!(metrics.ulcer_index > 0.0);
    }
}
