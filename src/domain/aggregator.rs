//! Tick-to-candle aggregation. Bars are right-exclusive on the interval
//! boundary: a tick at exactly `t_open + interval` belongs to the next bar.
//! Intervals with zero ticks are omitted rather than forward-filled, so a
//! `CandleTable` index is never a substitute for a timestamp.

use crate::domain::candle::{Candle, CandleTable, Universe};
use crate::domain::tick::Tick;

/// Aggregates a monotonic tick slice into fixed-interval mid-price candles.
/// `interval_minutes` must be positive; ticks must already satisfy
/// [`crate::domain::tick::validate_ticks`].
pub fn aggregate_ticks(ticks: &[Tick], interval_minutes: u32, lookback_periods: u32) -> CandleTable {
    let mut table = CandleTable::with_universe(Universe::new(interval_minutes, lookback_periods));
    if ticks.is_empty() {
        return table;
    }

    let interval_ns = interval_minutes as i64 * 60 * 1_000_000_000;
    debug_assert!(interval_ns > 0, "interval_minutes must be positive");

    let mut bucket_start = floor_to_interval(ticks[0].timestamp_ns, interval_ns);
    let mut open = f64::NAN;
    let mut high = f64::MIN;
    let mut low = f64::MAX;
    let mut close = f64::NAN;
    let mut count: u32 = 0;

    for tick in ticks {
        let price = tick.mid();
        let this_bucket = floor_to_interval(tick.timestamp_ns, interval_ns);

        if this_bucket != bucket_start {
            flush_bucket(&mut table, bucket_start, open, high, low, close, count);
            bucket_start = this_bucket;
            open = price;
            high = price;
            low = price;
            close = price;
            count = 0;
        }

        if count == 0 {
            open = price;
        }
        high = high.max(price);
        low = low.min(price);
        close = price;
        count += 1;
    }
    flush_bucket(&mut table, bucket_start, open, high, low, close, count);

    table
}

#[inline]
fn floor_to_interval(timestamp_ns: i64, interval_ns: i64) -> i64 {
    timestamp_ns - timestamp_ns.rem_euclid(interval_ns)
}

#[allow(clippy::too_many_arguments)]
fn flush_bucket(
    table: &mut CandleTable,
    bucket_start: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    count: u32,
) {
    if count > 0 {
        table.push(Candle::new(bucket_start, open, high, low, close, count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN_NS: i64 = 60 * 1_000_000_000;

    fn tick(ts_min: i64, bid: f64, ask: f64) -> Tick {
        Tick::new(ts_min * MIN_NS, bid, ask)
    }

    #[test]
    fn aggregates_into_right_exclusive_bars() {
        let ticks = vec![
            tick(0, 1.0998, 1.1000),
            tick(2, 1.1001, 1.1003),
            tick(4, 1.0995, 1.0997),
            tick(5, 1.1010, 1.1012),
        ];
        let table = aggregate_ticks(&ticks, 5, 20);

        assert_eq!(table.len(), 2);
        assert_eq!(table.volume[0], 3);
        assert_eq!(table.volume[1], 1);
        assert_eq!(table.t_open_ns[0], 0);
        assert_eq!(table.t_open_ns[1], 5 * MIN_NS);
    }

    #[test]
    fn omits_empty_intervals_rather_than_forward_filling() {
        let ticks = vec![tick(0, 1.10, 1.1002), tick(20, 1.11, 1.1102)];
        let table = aggregate_ticks(&ticks, 5, 20);

        assert_eq!(table.len(), 2);
        assert_eq!(table.t_open_ns[1], 20 * MIN_NS);
    }

    #[test]
    fn high_low_bound_the_mid_prices_in_bucket() {
        let ticks = vec![tick(0, 1.0990, 1.0992), tick(1, 1.1010, 1.1012), tick(2, 1.0980, 1.0982)];
        let table = aggregate_ticks(&ticks, 5, 20);

        assert_eq!(table.len(), 1);
        let candle = table.get(0);
        assert!((candle.high - 1.1011).abs() < 1e-9);
        assert!((candle.low - 1.0981).abs() < 1e-9);
        assert!((candle.open - 1.0991).abs() < 1e-9);
        assert!((candle.close - 1.0981).abs() < 1e-9);
    }

    #[test]
    fn empty_input_yields_empty_table() {
        let table = aggregate_ticks(&[], 5, 20);
        assert!(table.is_empty());
    }
}
