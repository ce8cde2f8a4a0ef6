//! The labeling kernel: given entry parameters and a forward window of highs
//! and lows, determine the first-hit outcome, MFE, MAE and r-multiple.
//!
//! Two implementations exist on purpose. [`label_reference`] is a slow,
//! obviously-correct scalar walk used only in tests as a correctness bridge.
//! [`label_fast`] is the one the bulk kernel calls: it takes slice
//! references directly into the candle table's typed arrays and allocates
//! nothing, so labeling ~14M candles across the full config grid does not
//! thrash the allocator.

use crate::labeling::outcome::{Direction, HitKind, LabelOutcome};

/// Labels one (candle, direction) pair against one (target, stop, horizon)
/// configuration. `highs`/`lows`/`t_open_ns` must be the full remaining
/// candle series starting at the entry candle's *next* bar (offset 0 = first
/// bar after entry); `entry_price`/`entry_ts_ns` describe the entry candle.
/// The forward scan is bounded by elapsed wall-clock time, not bar count:
/// candle spacing isn't uniform (the aggregator omits empty bars rather than
/// forward-filling them), so a bar-count horizon would drift from the
/// configured duration on gappy data.
#[allow(clippy::too_many_arguments)]
pub fn label_fast(
    entry_price: f64,
    entry_ts_ns: i64,
    highs: &[f64],
    lows: &[f64],
    t_open_ns: &[i64],
    pip_size: f64,
    direction: Direction,
    target_pips: f64,
    stop_pips: f64,
    horizon_ns: i64,
) -> LabelOutcome {
    let target_delta = target_pips * pip_size;
    let stop_delta = stop_pips * pip_size;

    let (target_price, stop_price) = match direction {
        Direction::Long => (entry_price + target_delta, entry_price - stop_delta),
        Direction::Short => (entry_price - target_delta, entry_price + stop_delta),
    };

    let mut mfe_price = entry_price;
    let mut mae_price = entry_price;
    let n = highs.len().min(t_open_ns.len());

    for i in 0..n {
        if t_open_ns[i] - entry_ts_ns > horizon_ns {
            break;
        }
        let high = highs[i];
        let low = lows[i];

        match direction {
            Direction::Long => {
                mfe_price = mfe_price.max(high);
                mae_price = mae_price.min(low);
            }
            Direction::Short => {
                mfe_price = mfe_price.min(low);
                mae_price = mae_price.max(high);
            }
        }

        let stop_touched = match direction {
            Direction::Long => low <= stop_price,
            Direction::Short => high >= stop_price,
        };
        // Stop is checked before target on every bar: a pessimistic,
        // deterministic tie-break when both are crossed in the same candle.
        if stop_touched {
            return finish(
                HitKind::Stop,
                Some(i as u32 + 1),
                entry_price,
                mfe_price,
                mae_price,
                stop_delta,
                pip_size,
                direction,
            );
        }

        let target_touched = match direction {
            Direction::Long => high >= target_price,
            Direction::Short => low <= target_price,
        };
        if target_touched {
            return finish(
                HitKind::Target,
                Some(i as u32 + 1),
                entry_price,
                mfe_price,
                mae_price,
                stop_delta,
                pip_size,
                direction,
            );
        }
    }

    let mfe_pips = signed_pips(entry_price, mfe_price, pip_size, direction).max(0.0);
    let mae_pips = (-signed_pips(entry_price, mae_price, pip_size, direction)).max(0.0);
    LabelOutcome::none_outcome(mfe_pips, mae_pips)
}

#[allow(clippy::too_many_arguments)]
fn finish(
    first_hit: HitKind,
    bars_to_hit: Option<u32>,
    entry_price: f64,
    mfe_price: f64,
    mae_price: f64,
    stop_delta: f64,
    pip_size: f64,
    direction: Direction,
) -> LabelOutcome {
    let mfe_pips = signed_pips(entry_price, mfe_price, pip_size, direction).max(0.0);
    let mae_pips = (-signed_pips(entry_price, mae_price, pip_size, direction)).max(0.0);

    let r_multiple = match first_hit {
        HitKind::Stop => -1.0,
        HitKind::Target => {
            if stop_delta > f64::EPSILON {
                mfe_pips * pip_size / stop_delta
            } else {
                0.0
            }
        }
        HitKind::None => 0.0,
    };

    LabelOutcome {
        first_hit,
        bars_to_hit,
        mfe_pips,
        mae_pips,
        r_multiple,
    }
}

/// Signed price move in pips from entry, positive meaning favorable for the
/// given direction.
#[inline]
fn signed_pips(entry: f64, price: f64, pip_size: f64, direction: Direction) -> f64 {
    let raw = match direction {
        Direction::Long => price - entry,
        Direction::Short => entry - price,
    };
    raw / pip_size
}

/// Reference implementation: allocates a window `Vec` and recomputes target
/// and stop from scratch every call. Deliberately naive — exists only so
/// tests can assert it agrees with [`label_fast`] on random inputs.
#[allow(clippy::too_many_arguments)]
pub fn label_reference(
    entry_price: f64,
    entry_ts_ns: i64,
    highs: &[f64],
    lows: &[f64],
    t_open_ns: &[i64],
    pip_size: f64,
    direction: Direction,
    target_pips: f64,
    stop_pips: f64,
    horizon_ns: i64,
) -> LabelOutcome {
    let window: Vec<(f64, f64)> = highs
        .iter()
        .zip(lows.iter())
        .zip(t_open_ns.iter())
        .take_while(|(_, &ts)| ts - entry_ts_ns <= horizon_ns)
        .map(|((&h, &l), _)| (h, l))
        .collect();

    let target_delta = target_pips * pip_size;
    let stop_delta = stop_pips * pip_size;
    let (target_price, stop_price) = match direction {
        Direction::Long => (entry_price + target_delta, entry_price - stop_delta),
        Direction::Short => (entry_price - target_delta, entry_price + stop_delta),
    };

    let mut mfe_price = entry_price;
    let mut mae_price = entry_price;

    for (i, (high, low)) in window.iter().enumerate() {
        match direction {
            Direction::Long => {
                mfe_price = mfe_price.max(*high);
                mae_price = mae_price.min(*low);
            }
            Direction::Short => {
                mfe_price = mfe_price.min(*low);
                mae_price = mae_price.max(*high);
            }
        }

        let stop_touched = match direction {
            Direction::Long => *low <= stop_price,
            Direction::Short => *high >= stop_price,
        };
        if stop_touched {
            return finish(
                HitKind::Stop,
                Some(i as u32 + 1),
                entry_price,
                mfe_price,
                mae_price,
                stop_delta,
                pip_size,
                direction,
            );
        }

        let target_touched = match direction {
            Direction::Long => *high >= target_price,
            Direction::Short => *low <= target_price,
        };
        if target_touched {
            return finish(
                HitKind::Target,
                Some(i as u32 + 1),
                entry_price,
                mfe_price,
                mae_price,
                stop_delta,
                pip_size,
                direction,
            );
        }
    }

    let mfe_pips = signed_pips(entry_price, mfe_price, pip_size, direction).max(0.0);
    let mae_pips = (-signed_pips(entry_price, mae_price, pip_size, direction)).max(0.0);
    LabelOutcome::none_outcome(mfe_pips, mae_pips)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bar spacing used by these tests: one candle per minute, starting at
    /// entry_ts_ns = 0. A horizon of N bars is then N * BAR_NS.
    const BAR_NS: i64 = 60_000_000_000;

    fn ts_from(n: usize) -> Vec<i64> {
        (1..=n as i64).map(|i| i * BAR_NS).collect()
    }

    #[test]
    fn target_hit_before_stop() {
        let highs = vec![1.0010, 1.0020];
        let lows = vec![1.0001, 1.0002];
        let ts = ts_from(highs.len());
        let out = label_fast(1.0000, 0, &highs, &lows, &ts, 1e-4, Direction::Long, 10.0, 20.0, 5 * BAR_NS);
        assert_eq!(out.first_hit, HitKind::Target);
        assert_eq!(out.bars_to_hit, Some(1));
    }

    #[test]
    fn stop_wins_same_bar_tie() {
        // Bar crosses both target (+10p) and stop (-10p) simultaneously.
        let highs = vec![1.0015];
        let lows = vec![0.9985];
        let ts = ts_from(highs.len());
        let out = label_fast(1.0000, 0, &highs, &lows, &ts, 1e-4, Direction::Long, 10.0, 10.0, 5 * BAR_NS);
        assert_eq!(out.first_hit, HitKind::Stop);
        assert!((out.r_multiple - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn horizon_elapses_without_a_hit() {
        let highs = vec![1.0002, 1.0003, 1.0001];
        let lows = vec![0.9999, 0.9998, 0.9997];
        let ts = ts_from(highs.len());
        let out = label_fast(1.0000, 0, &highs, &lows, &ts, 1e-4, Direction::Long, 50.0, 50.0, 3 * BAR_NS);
        assert_eq!(out.first_hit, HitKind::None);
        assert_eq!(out.bars_to_hit, None);
        assert!(out.mfe_pips >= 0.0 && out.mae_pips >= 0.0);
    }

    #[test]
    fn data_ends_before_horizon_yields_partial_none() {
        let highs = vec![1.0003];
        let lows = vec![0.9998];
        let ts = ts_from(highs.len());
        let out = label_fast(1.0000, 0, &highs, &lows, &ts, 1e-4, Direction::Long, 50.0, 50.0, 10 * BAR_NS);
        assert_eq!(out.first_hit, HitKind::None);
        assert!((out.mfe_pips - 3.0).abs() < 1e-6);
        assert!((out.mae_pips - 2.0).abs() < 1e-6);
    }

    #[test]
    fn horizon_boundary_excludes_a_bar_that_opens_past_it() {
        // Horizon of exactly 2 bars: the 3rd bar's open sits past the
        // boundary and must not be scanned even though it would stop out.
        let highs = vec![1.0002, 1.0003, 1.0100];
        let lows = vec![0.9999, 0.9998, 0.9001];
        let ts = ts_from(highs.len());
        let out = label_fast(1.0000, 0, &highs, &lows, &ts, 1e-4, Direction::Long, 50.0, 50.0, 2 * BAR_NS);
        assert_eq!(out.first_hit, HitKind::None);
    }

    #[test]
    fn fast_and_reference_agree_on_short_direction() {
        let highs = vec![1.0005, 1.0008, 1.0012, 1.0020];
        let lows = vec![0.9995, 0.9990, 0.9988, 0.9980];
        let ts = ts_from(highs.len());
        for target in [5.0, 15.0, 30.0] {
            for stop in [5.0, 15.0] {
                let fast = label_fast(1.0000, 0, &highs, &lows, &ts, 1e-4, Direction::Short, target, stop, 4 * BAR_NS);
                let reference =
                    label_reference(1.0000, 0, &highs, &lows, &ts, 1e-4, Direction::Short, target, stop, 4 * BAR_NS);
                assert_eq!(fast, reference);
            }
        }
    }
}
