//! Fixed-interval OHLC bars with a mid price — the unit the rest of the
//! pipeline (labeling, features, backtesting) operates on.

use serde::{Deserialize, Serialize};

/// One (interval_minutes, lookback_periods) resolution at which the pipeline
/// is evaluated. Two universes never share a candle table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Universe {
    pub interval_minutes: u32,
    pub lookback_periods: u32,
}

impl Universe {
    pub fn new(interval_minutes: u32, lookback_periods: u32) -> Self {
        Self {
            interval_minutes,
            lookback_periods,
        }
    }
}

/// A single OHLC bar. `low <= open,close <= high` is enforced at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub t_open_ns: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub mid: f64,
    pub volume: u32,
}

impl Candle {
    pub fn new(t_open_ns: i64, open: f64, high: f64, low: f64, close: f64, volume: u32) -> Self {
        debug_assert!(low <= open && open <= high, "open outside [low, high]");
        debug_assert!(low <= close && close <= high, "close outside [low, high]");
        Self {
            t_open_ns,
            open,
            high,
            low,
            close,
            mid: (open + close) / 2.0,
            volume,
        }
    }

    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    #[inline]
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// Column-oriented table of candles for one universe. Parallel arrays, not
/// per-row objects — this is the layout every downstream kernel expects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandleTable {
    pub universe: Option<Universe>,
    pub t_open_ns: Vec<i64>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub mid: Vec<f64>,
    pub volume: Vec<u32>,
}

impl CandleTable {
    pub fn with_universe(universe: Universe) -> Self {
        Self {
            universe: Some(universe),
            ..Default::default()
        }
    }

    pub fn push(&mut self, candle: Candle) {
        self.t_open_ns.push(candle.t_open_ns);
        self.open.push(candle.open);
        self.high.push(candle.high);
        self.low.push(candle.low);
        self.close.push(candle.close);
        self.mid.push(candle.mid);
        self.volume.push(candle.volume);
    }

    pub fn len(&self) -> usize {
        self.t_open_ns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t_open_ns.is_empty()
    }

    pub fn get(&self, idx: usize) -> Candle {
        Candle {
            t_open_ns: self.t_open_ns[idx],
            open: self.open[idx],
            high: self.high[idx],
            low: self.low[idx],
            close: self.close[idx],
            mid: self.mid[idx],
            volume: self.volume[idx],
        }
    }

    /// True iff `t_open_ns` is non-decreasing end to end (the aggregator's
    /// monotonicity guarantee, re-checked at cache load time).
    pub fn is_monotonic(&self) -> bool {
        self.t_open_ns.windows(2).all(|w| w[0] <= w[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candle_table_roundtrips_rows() {
        let mut table = CandleTable::with_universe(Universe::new(5, 20));
        table.push(Candle::new(0, 1.0, 1.1, 0.9, 1.05, 10));
        table.push(Candle::new(300_000_000_000, 1.05, 1.2, 1.0, 1.1, 12));

        assert_eq!(table.len(), 2);
        assert!(table.is_monotonic());
        let row = table.get(1);
        assert_eq!(row.volume, 12);
        assert!((row.mid - (1.05 + 1.1) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn range_and_direction() {
        let up = Candle::new(0, 1.0, 1.2, 0.95, 1.1, 5);
        assert!(up.is_bullish());
        assert!((up.range() - 0.25).abs() < 1e-12);

        let down = Candle::new(0, 1.1, 1.2, 0.95, 1.0, 5);
        assert!(!down.is_bullish());
    }
}
