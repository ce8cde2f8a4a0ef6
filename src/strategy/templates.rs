//! The four required signal templates. Each is a pure function from a
//! candle table and a small parameter set to a raw `{-1, 0, +1}` signal
//! series — invariant enforcement (cooldown, daily cap) happens one layer
//! up in [`crate::strategy::invariants`], never inside a template.

use crate::domain::CandleTable;

fn rolling_mean_std(values: &[f64], end_exclusive: usize, lookback: usize) -> Option<(f64, f64)> {
    if end_exclusive < lookback {
        return None;
    }
    let window = &values[end_exclusive - lookback..end_exclusive];
    let n = lookback as f64;
    let mean = window.iter().sum::<f64>() / n;
    let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, var.sqrt()))
}

/// Rolling z-score of mid price against its own trailing window. Fades
/// extremes: a price far above its recent mean signals short (expecting
/// reversion down), far below signals long.
pub fn mean_reversion_signal(candles: &CandleTable, lookback: usize, threshold_std: f64) -> Vec<i8> {
    let mid = &candles.mid;
    let mut out = vec![0i8; mid.len()];
    for i in 0..mid.len() {
        let Some((mean, std_dev)) = rolling_mean_std(mid, i, lookback) else {
            continue;
        };
        if std_dev <= f64::EPSILON {
            continue;
        }
        let z = (mid[i] - mean) / std_dev;
        if z > threshold_std {
            out[i] = -1;
        } else if z < -threshold_std {
            out[i] = 1;
        }
    }
    out
}

/// Standardized single-bar return against the trailing distribution of
/// single-bar returns. A burst beyond `threshold_std` std devs signals in
/// the direction of the burst (continuation, not reversion).
pub fn momentum_burst_signal(candles: &CandleTable, lookback: usize, threshold_std: f64) -> Vec<i8> {
    let mid = &candles.mid;
    if mid.len() < 2 {
        return vec![0i8; mid.len()];
    }

    let returns: Vec<f64> = (1..mid.len())
        .map(|i| if mid[i - 1].abs() > f64::EPSILON { mid[i] / mid[i - 1] - 1.0 } else { 0.0 })
        .collect();

    let mut out = vec![0i8; mid.len()];
    for i in 1..mid.len() {
        let r_idx = i - 1; // returns[r_idx] = return realized at candle i
        let Some((mean, std_dev)) = rolling_mean_std(&returns, r_idx, lookback) else {
            continue;
        };
        if std_dev <= f64::EPSILON {
            continue;
        }
        let z = (returns[r_idx] - mean) / std_dev;
        if z > threshold_std {
            out[i] = 1;
        } else if z < -threshold_std {
            out[i] = -1;
        }
    }
    out
}

/// Donchian-channel breakout: signals in the direction of a close beyond
/// the high/low extremes of the preceding `lookback` candles.
pub fn breakout_signal(candles: &CandleTable, lookback: usize) -> Vec<i8> {
    let n = candles.len();
    let mut out = vec![0i8; n];
    for i in lookback..n {
        let window_high = candles.high[i - lookback..i].iter().cloned().fold(f64::MIN, f64::max);
        let window_low = candles.low[i - lookback..i].iter().cloned().fold(f64::MAX, f64::min);
        if candles.close[i] > window_high {
            out[i] = 1;
        } else if candles.close[i] < window_low {
            out[i] = -1;
        }
    }
    out
}

/// Sign of the close-to-close move over the trailing `lookback` window —
/// the plainest possible trend-following rule.
pub fn trend_follower_signal(candles: &CandleTable, lookback: usize) -> Vec<i8> {
    let n = candles.len();
    let mut out = vec![0i8; n];
    for i in lookback..n {
        let delta = candles.close[i] - candles.close[i - lookback];
        if delta > f64::EPSILON {
            out[i] = 1;
        } else if delta < -f64::EPSILON {
            out[i] = -1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Candle, Universe};

    fn flat_candles(n: usize, price: f64) -> CandleTable {
        let mut table = CandleTable::with_universe(Universe::new(5, 20));
        for i in 0..n {
            table.push(Candle::new(i as i64 * 300_000_000_000, price, price, price, price, 1));
        }
        table
    }

    fn trending_candles(n: usize) -> CandleTable {
        let mut table = CandleTable::with_universe(Universe::new(5, 20));
        for i in 0..n {
            let p = 1.0 + i as f64 * 0.0005;
            table.push(Candle::new(i as i64 * 300_000_000_000, p, p + 0.0001, p - 0.0001, p, 1));
        }
        table
    }

    #[test]
    fn flat_price_series_never_signals_mean_reversion() {
        let candles = flat_candles(50, 1.1);
        let signal = mean_reversion_signal(&candles, 20, 2.0);
        assert!(signal.iter().all(|&s| s == 0));
    }

    #[test]
    fn trend_follower_signals_long_in_a_steady_uptrend() {
        let candles = trending_candles(100);
        let signal = trend_follower_signal(&candles, 20);
        assert!(signal[50..].iter().all(|&s| s == 1));
    }

    #[test]
    fn breakout_fires_on_a_close_above_the_prior_channel() {
        let mut table = CandleTable::with_universe(Universe::new(5, 20));
        for i in 0..20 {
            table.push(Candle::new(i as i64 * 300_000_000_000, 1.1, 1.1005, 1.0995, 1.1, 1));
        }
        table.push(Candle::new(20 * 300_000_000_000, 1.1, 1.15, 1.1, 1.15, 1));
        let signal = breakout_signal(&table, 20);
        assert_eq!(signal[20], 1);
    }

    #[test]
    fn momentum_burst_fires_on_an_outsized_single_bar_return() {
        let mut table = CandleTable::with_universe(Universe::new(5, 20));
        for i in 0..30 {
            let p = 1.1 + (i as f64 * 0.00001);
            table.push(Candle::new(i as i64 * 300_000_000_000, p, p, p, p, 1));
        }
        let p = table.close[29] * 1.02;
        table.push(Candle::new(30 * 300_000_000_000, p, p, p, p, 1));
        let signal = momentum_burst_signal(&table, 10, 2.0);
        assert_eq!(signal[30], 1);
    }
}
