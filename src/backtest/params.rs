//! The backtester's parameter block: everything one simulation run needs
//! besides the candles and the signal series.

use crate::config::{LotSize, PipDistance};

#[derive(Debug, Clone)]
pub struct BacktestParams {
    pub stop_loss_pips: PipDistance,
    pub take_profit_pips: PipDistance,
    pub lot_size: LotSize,
    pub pip_value_per_lot: f64,
    pub commission_per_lot: f64,
    pub initial_capital: f64,
    pub pip_size: f64,
    /// Constant half-spread estimate used to derive ask/bid fill prices from
    /// the candle table's mid-based OHLC (see `backtest` module docs — the
    /// candle schema carries a single mid-based OHLC, not separate bid/ask
    /// OHLC series).
    pub spread_pips: f64,
    /// `None` means no timeout other than the data running out.
    pub max_duration_bars: Option<u32>,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            stop_loss_pips: PipDistance::new(20.0),
            take_profit_pips: PipDistance::new(30.0),
            lot_size: LotSize::new(0.1),
            pip_value_per_lot: 10.0,
            commission_per_lot: 7.0,
            initial_capital: 10_000.0,
            pip_size: 1e-4,
            spread_pips: 1.0,
            max_duration_bars: None,
        }
    }
}
