//! Per-candle labeling outcome: what happens if a position were opened at
//! this candle's close and held until target, stop, or horizon.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    Long = 0,
    Short = 1,
}

/// Which of the three terminal conditions fired first. `Stop` wins ties
/// against `Target` on the same bar — the kernel always checks stop first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum HitKind {
    Target = 0,
    Stop = 1,
    None = 2,
}

/// The full outcome computed for one (candle, config, direction) triple.
/// Stored as `f32` in the bulk table (component B produces on the order of
/// 10^9 of these across the full grid); this struct is the per-row view used
/// when inspecting or testing a single outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelOutcome {
    pub first_hit: HitKind,
    /// `None` when the horizon elapsed or the data ended before any hit.
    pub bars_to_hit: Option<u32>,
    /// Maximum favorable excursion reached before exit, in pips (>= 0).
    pub mfe_pips: f64,
    /// Maximum adverse excursion reached before exit, in pips (>= 0).
    pub mae_pips: f64,
    /// Realized move at exit divided by the risked (stop) distance.
    pub r_multiple: f64,
}

impl LabelOutcome {
    pub fn none_outcome(mfe_pips: f64, mae_pips: f64) -> Self {
        Self {
            first_hit: HitKind::None,
            bars_to_hit: None,
            mfe_pips,
            mae_pips,
            r_multiple: 0.0,
        }
    }
}
