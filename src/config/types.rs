//! Newtype value objects for the research engine's domain quantities.
//! Each wraps a validated `f64`/integer so a pip count can never be passed
//! where a fraction is expected, and vice versa.

use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// A price move expressed in pips (already pip-size-adjusted, not raw price).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipDistance(f64);

impl PipDistance {
    pub const fn new(val: f64) -> Self {
        let v = if val < 0.0 { 0.0 } else { val };
        Self(v)
    }

    /// Converts to a raw price delta given the pair's pip size.
    pub fn to_price_delta(&self, pip_size: f64) -> f64 {
        self.0 * pip_size
    }
}

impl Deref for PipDistance {
    type Target = f64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for PipDistance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}p", self.0)
    }
}

/// Risk-multiple (realized move / risked distance), signed.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct RMultiple(f64);

impl RMultiple {
    pub const fn new(val: f64) -> Self {
        Self(val)
    }
}

impl Deref for RMultiple {
    type Target = f64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for RMultiple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:+.2}R", self.0)
    }
}

/// Position size in standard lots.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LotSize(f64);

impl LotSize {
    pub const fn new(val: f64) -> Self {
        let v = if val <= 0.0 { 0.01 } else { val };
        Self(v)
    }
}

impl Deref for LotSize {
    type Target = f64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for LotSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} lots", self.0)
    }
}

/// Wall-clock duration a label configuration is allowed to look forward,
/// in nanoseconds — the same epoch unit as `CandleTable::t_open_ns`, so the
/// labeling kernel bounds its forward scan by elapsed time rather than bar
/// count (candle spacing isn't uniform: the aggregator omits empty bars
/// instead of forward-filling them).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HorizonNs(pub i64);

impl HorizonNs {
    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes as i64 * 60_000_000_000)
    }
}

impl Deref for HorizonNs {
    type Target = i64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for HorizonNs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}m", self.0 / 60_000_000_000)
    }
}

/// Minimum wall-clock gap a strategy must leave between trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CooldownMinutes(pub u32);

impl Deref for CooldownMinutes {
    type Target = u32;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Maximum trades a strategy may open within a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaxTradesPerDay(pub u32);

impl Deref for MaxTradesPerDay {
    type Target = u32;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A single weight in the ranker's composite score. Clamped non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankerWeight(f64);

impl RankerWeight {
    pub const fn new(val: f64) -> Self {
        let v = if val < 0.0 { 0.0 } else { val };
        Self(v)
    }
}

impl Deref for RankerWeight {
    type Target = f64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for RankerWeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pip_distance_clamps_negative() {
        assert_eq!(*PipDistance::new(-5.0), 0.0);
        assert!((PipDistance::new(20.0).to_price_delta(1e-4) - 0.0020).abs() < 1e-12);
    }

    #[test]
    fn lot_size_floors_to_minimum() {
        assert_eq!(*LotSize::new(0.0), 0.01);
        assert_eq!(*LotSize::new(-1.0), 0.01);
    }

    #[test]
    fn ranker_weight_clamps_negative() {
        assert_eq!(*RankerWeight::new(-0.5), 0.0);
    }
}
