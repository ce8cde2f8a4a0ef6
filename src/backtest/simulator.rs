//! Vectorized-signal backtest runner. At most one open position at a time;
//! entries and exits both fill on the bar *after* the signal, never on the
//! signal's own bar.

use crate::backtest::params::BacktestParams;
use crate::backtest::trade::{ExitReason, Trade};
use crate::domain::CandleTable;
use crate::labeling::Direction;

#[derive(Debug, Clone)]
pub struct BacktestRun {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<f64>,
    pub elapsed_days: f64,
}

struct OpenPosition {
    direction: Direction,
    entry_idx: usize,
    entry_price: f64,
    stop_price: f64,
    target_price: f64,
}

/// Ask/bid approximated from the mid-based OHLC via a constant half-spread,
/// since the candle table carries only a single mid-based OHLC series.
fn ask_price(mid: f64, params: &BacktestParams) -> f64 {
    mid + params.spread_pips / 2.0 * params.pip_size
}

fn bid_price(mid: f64, params: &BacktestParams) -> f64 {
    mid - params.spread_pips / 2.0 * params.pip_size
}

fn open_position(direction: Direction, idx: usize, candles: &CandleTable, params: &BacktestParams) -> OpenPosition {
    let fill = candles.open[idx];
    let entry_price = match direction {
        Direction::Long => ask_price(fill, params),
        Direction::Short => bid_price(fill, params),
    };
    let stop_pips = *params.stop_loss_pips;
    let target_pips = *params.take_profit_pips;
    let (stop_price, target_price) = match direction {
        Direction::Long => (entry_price - stop_pips * params.pip_size, entry_price + target_pips * params.pip_size),
        Direction::Short => (entry_price + stop_pips * params.pip_size, entry_price - target_pips * params.pip_size),
    };
    OpenPosition {
        direction,
        entry_idx: idx,
        entry_price,
        stop_price,
        target_price,
    }
}

/// Checks whether bar `idx` resolves the open position, applying the same
/// pessimistic tie-break as the labeling kernel: a stop touch wins over a
/// target touch on the same bar.
fn check_intrabar_exit(pos: &OpenPosition, idx: usize, candles: &CandleTable) -> Option<ExitReason> {
    let high = candles.high[idx];
    let low = candles.low[idx];
    match pos.direction {
        Direction::Long => {
            if low <= pos.stop_price {
                Some(ExitReason::Stop)
            } else if high >= pos.target_price {
                Some(ExitReason::Target)
            } else {
                None
            }
        }
        Direction::Short => {
            if high >= pos.stop_price {
                Some(ExitReason::Stop)
            } else if low <= pos.target_price {
                Some(ExitReason::Target)
            } else {
                None
            }
        }
    }
}

fn close_side_price(pos: &OpenPosition, reason: ExitReason, idx: usize, candles: &CandleTable, params: &BacktestParams) -> f64 {
    let exit_mid = match reason {
        ExitReason::Stop => pos.stop_price,
        ExitReason::Target => pos.target_price,
        ExitReason::Signal | ExitReason::Timeout => candles.open[idx],
    };
    match pos.direction {
        Direction::Long => bid_price(exit_mid, params),
        Direction::Short => ask_price(exit_mid, params),
    }
}

fn close_position(pos: OpenPosition, reason: ExitReason, idx: usize, candles: &CandleTable, params: &BacktestParams) -> Trade {
    let exit_price = close_side_price(&pos, reason, idx, candles, params);
    let pnl_pips = match pos.direction {
        Direction::Long => (exit_price - pos.entry_price) / params.pip_size,
        Direction::Short => (pos.entry_price - exit_price) / params.pip_size,
    };
    let lot_size = *params.lot_size;
    let pnl_usd = pnl_pips * params.pip_value_per_lot * lot_size - params.commission_per_lot * lot_size;

    Trade {
        id: Trade::new_id(),
        direction: pos.direction,
        entry_idx: pos.entry_idx,
        exit_idx: idx,
        entry_price: pos.entry_price,
        exit_price,
        stop_price: pos.stop_price,
        target_price: pos.target_price,
        exit_reason: reason,
        lot_size,
        pnl_pips,
        pnl_usd,
    }
}

/// Runs one strategy's raw signal series against `candles`. `signal[i]` is
/// the decision made as of the close of bar `i`; the resulting position
/// change fills at bar `i + 1`'s open, matching the one-bar-delay convention
/// every template in `strategy::templates` is built on.
pub fn run_backtest(candles: &CandleTable, signal: &[i8], params: &BacktestParams) -> BacktestRun {
    let n = candles.len();
    let mut trades = Vec::with_capacity(n / 8 + 1);
    let mut equity_curve = Vec::with_capacity(n);
    let mut equity = params.initial_capital;
    let mut position: Option<OpenPosition> = None;

    for idx in 0..n {
        if let Some(pos) = &position {
            let age = (idx - pos.entry_idx) as u32;
            let timed_out = params.max_duration_bars.is_some_and(|max| age >= max);

            if let Some(reason) = check_intrabar_exit(pos, idx, candles) {
                let pos = position.take().unwrap();
                let trade = close_position(pos, reason, idx, candles, params);
                equity += trade.pnl_usd;
                trades.push(trade);
            } else if timed_out {
                let pos = position.take().unwrap();
                let trade = close_position(pos, ExitReason::Timeout, idx, candles, params);
                equity += trade.pnl_usd;
                trades.push(trade);
            }
        }

        if idx == 0 {
            equity_curve.push(equity);
            continue;
        }

        let desired = signal[idx - 1];
        let wants_long = desired > 0;
        let wants_short = desired < 0;

        let reversed = match (&position, wants_long, wants_short) {
            (Some(pos), true, _) if pos.direction == Direction::Short => true,
            (Some(pos), _, true) if pos.direction == Direction::Long => true,
            _ => false,
        };

        if reversed {
            let pos = position.take().unwrap();
            let trade = close_position(pos, ExitReason::Signal, idx, candles, params);
            equity += trade.pnl_usd;
            trades.push(trade);
        }

        if position.is_none() && (wants_long || wants_short) {
            let direction = if wants_long { Direction::Long } else { Direction::Short };
            let pos = open_position(direction, idx, candles, params);

            // The entry bar's own range is live too — a position can stop or
            // target out on the very bar it fills, with no one-bar grace
            // period.
            if let Some(reason) = check_intrabar_exit(&pos, idx, candles) {
                let trade = close_position(pos, reason, idx, candles, params);
                equity += trade.pnl_usd;
                trades.push(trade);
            } else {
                position = Some(pos);
            }
        }

        equity_curve.push(equity);
    }

    if let Some(pos) = position.take() {
        let last = n - 1;
        let trade = close_position(pos, ExitReason::Timeout, last, candles, params);
        equity += trade.pnl_usd;
        trades.push(trade);
        if let Some(last_point) = equity_curve.last_mut() {
            *last_point = equity;
        }
    }

    trades.shrink_to_fit();

    let elapsed_days = if n >= 2 {
        ((candles.t_open_ns[n - 1] - candles.t_open_ns[0]) as f64 / 1e9 / 86_400.0).max(1.0)
    } else {
        1.0
    };

    BacktestRun {
        trades,
        equity_curve,
        elapsed_days,
    }
}
