//! Raw bid/ask ticks — the finest-grained input to the pipeline.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// One bid/ask quote. Timestamps are nanoseconds since the Unix epoch and are
/// assumed monotonically non-decreasing within a single pair/year file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub timestamp_ns: i64,
    pub bid: f64,
    pub ask: f64,
}

impl Tick {
    pub fn new(timestamp_ns: i64, bid: f64, ask: f64) -> Self {
        Self {
            timestamp_ns,
            bid,
            ask,
        }
    }

    #[inline]
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    #[inline]
    pub fn spread_pips(&self, pip_size: f64) -> f64 {
        (self.ask - self.bid) / pip_size
    }

    pub fn is_valid(&self) -> bool {
        self.bid.is_finite() && self.ask.is_finite() && self.bid <= self.ask
    }
}

/// Validates a tick sequence against the invariants the rest of the pipeline
/// relies on: monotonically non-decreasing timestamps, bid <= ask everywhere.
/// Raises `EngineError::Input` — callers at the orchestrator boundary turn
/// that into a fatal, ledger-recorded failure.
pub fn validate_ticks(ticks: &[Tick]) -> Result<(), EngineError> {
    if ticks.is_empty() {
        return Err(EngineError::Input("tick sequence is empty".to_string()));
    }

    let mut prev_ts = i64::MIN;
    for (i, tick) in ticks.iter().enumerate() {
        if !tick.is_valid() {
            return Err(EngineError::Input(format!("tick {i} has bid > ask or non-finite price")));
        }
        if tick.timestamp_ns < prev_ts {
            return Err(EngineError::Input(format!(
                "tick {i} timestamp {} is earlier than previous {prev_ts}",
                tick.timestamp_ns
            )));
        }
        prev_ts = tick.timestamp_ns;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_and_spread() {
        let t = Tick::new(0, 1.1000, 1.1002);
        assert!((t.mid() - 1.1001).abs() < 1e-9);
        assert!((t.spread_pips(1e-4) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_monotonic() {
        let ticks = vec![Tick::new(10, 1.0, 1.0001), Tick::new(5, 1.0, 1.0001)];
        assert!(validate_ticks(&ticks).is_err());
    }

    #[test]
    fn rejects_crossed_book() {
        let ticks = vec![Tick::new(0, 1.0005, 1.0001)];
        assert!(validate_ticks(&ticks).is_err());
    }

    #[test]
    fn accepts_well_formed_sequence() {
        let ticks = vec![
            Tick::new(0, 1.0, 1.0001),
            Tick::new(5, 1.0001, 1.0002),
            Tick::new(5, 1.0001, 1.0003),
        ];
        assert!(validate_ticks(&ticks).is_ok());
    }
}
