//! A hand-computed target-hit scenario for the backtester (component G):
//! one long trade, entry and exit prices chosen so the expected pip count
//! and dollar P&L can be checked by arithmetic rather than by trusting the
//! simulator's own output.

use fx_research_engine::backtest::{run_backtest, BacktestParams};
use fx_research_engine::config::{LotSize, PipDistance};
use fx_research_engine::domain::{Candle, CandleTable};

fn minute(i: i64) -> i64 {
    i * 60_000_000_000
}

#[test]
fn a_long_trade_hitting_its_target_pays_out_the_exact_pip_and_dollar_amount() {
    let mut candles = CandleTable::default();
    // bar 0: signal fires here, fills at bar 1's open.
    candles.push(Candle::new(minute(0), 1.1000, 1.1000, 1.1000, 1.1000, 1));
    // bar 1: entry fill at open = 1.1000 (spread is zero in this params block).
    candles.push(Candle::new(minute(1), 1.1000, 1.1000, 1.1000, 1.1000, 1));
    // bar 2: high clears the 30-pip target before low comes anywhere near the 20-pip stop.
    candles.push(Candle::new(minute(2), 1.1000, 1.1035, 1.0990, 1.1010, 1));

    let signal = vec![1i8, 0, 0];
    let params = BacktestParams {
        stop_loss_pips: PipDistance::new(20.0),
        take_profit_pips: PipDistance::new(30.0),
        lot_size: LotSize::new(1.0),
        pip_value_per_lot: 10.0,
        commission_per_lot: 7.0,
        initial_capital: 10_000.0,
        pip_size: 1e-4,
        spread_pips: 0.0,
        max_duration_bars: None,
    };

    let run = run_backtest(&candles, &signal, &params);

    assert_eq!(run.trades.len(), 1);
    let trade = &run.trades[0];
    assert!((trade.pnl_pips - 30.0).abs() < 1e-9, "expected a clean 30-pip target exit, got {}", trade.pnl_pips);
    assert!((trade.pnl_usd - 293.0).abs() < 1e-9, "30 pips * $10/lot * 1 lot - $7 commission = $293, got {}", trade.pnl_usd);
    assert!((run.equity_curve.last().unwrap() - 10_293.0).abs() < 1e-9);
}

#[test]
fn a_long_trade_hitting_its_stop_loses_the_exact_amount_and_stop_beats_target_on_the_same_bar() {
    let mut candles = CandleTable::default();
    candles.push(Candle::new(minute(0), 1.1000, 1.1000, 1.1000, 1.1000, 1));
    candles.push(Candle::new(minute(1), 1.1000, 1.1000, 1.1000, 1.1000, 1));
    // Both the stop (1.0980) and the target (1.1030) are touched on the same bar;
    // the pessimistic tie-break means the stop wins.
    candles.push(Candle::new(minute(2), 1.1000, 1.1035, 1.0970, 1.1010, 1));

    let signal = vec![1i8, 0, 0];
    let params = BacktestParams {
        stop_loss_pips: PipDistance::new(20.0),
        take_profit_pips: PipDistance::new(30.0),
        lot_size: LotSize::new(1.0),
        pip_value_per_lot: 10.0,
        commission_per_lot: 7.0,
        initial_capital: 10_000.0,
        pip_size: 1e-4,
        spread_pips: 0.0,
        max_duration_bars: None,
    };

    let run = run_backtest(&candles, &signal, &params);

    assert_eq!(run.trades.len(), 1);
    let trade = &run.trades[0];
    assert!((trade.pnl_pips + 20.0).abs() < 1e-9, "expected a clean 20-pip stop loss, got {}", trade.pnl_pips);
    assert!((trade.pnl_usd + 207.0).abs() < 1e-9, "-20 pips * $10/lot * 1 lot - $7 commission = -$207, got {}", trade.pnl_usd);
}
