//! The multi-dimensional label grid: the Cartesian product of target
//! distances, stop distances, and horizons that the labeling kernel
//! evaluates for every candle.

use crate::config::types::{HorizonNs, PipDistance};
use itertools::iproduct;
use serde::{Deserialize, Serialize};

/// One (target, stop, horizon) combination the labeling kernel evaluates.
/// `name` is deterministic so cache files and report rows are stable across
/// runs that enumerate the same grid in the same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    pub target_pips: PipDistance,
    pub stop_pips: PipDistance,
    pub horizon: HorizonNs,
}

impl LabelConfig {
    pub fn name(&self) -> String {
        format!(
            "t{:.0}_s{:.0}_h{}m",
            *self.target_pips,
            *self.stop_pips,
            *self.horizon / 60_000_000_000,
        )
    }
}

/// Axis definitions the grid is built from. Kept separate from `LabelConfig`
/// so the orchestrator can hash the axes (not the expanded product) into the
/// schema fingerprint. `horizons` are wall-clock minutes; they're converted
/// to nanosecond durations when the grid is expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelGrid {
    pub target_pips: Vec<f64>,
    pub stop_pips: Vec<f64>,
    pub horizons: Vec<u32>,
}

impl LabelGrid {
    pub fn new(target_pips: Vec<f64>, stop_pips: Vec<f64>, horizons: Vec<u32>) -> Self {
        Self {
            target_pips,
            stop_pips,
            horizons,
        }
    }

    /// Reasonable default grid: ~7 targets x 6 stops x 5 horizons = 210
    /// configurations, matching the spec's documented grid size. Horizons
    /// are minutes: 12m through 288m (4.8h).
    pub fn default_grid() -> Self {
        Self::new(
            vec![5.0, 10.0, 15.0, 20.0, 30.0, 50.0, 80.0],
            vec![5.0, 10.0, 15.0, 20.0, 30.0, 50.0],
            vec![12, 24, 48, 96, 288],
        )
    }

    pub fn len(&self) -> usize {
        self.target_pips.len() * self.stop_pips.len() * self.horizons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expands the axes into the full list of configurations in a fixed,
    /// deterministic iteration order (targets outermost, horizons innermost).
    pub fn expand(&self) -> Vec<LabelConfig> {
        iproduct!(
            self.target_pips.iter().copied(),
            self.stop_pips.iter().copied(),
            self.horizons.iter().copied()
        )
        .map(|(target, stop, horizon)| LabelConfig {
            target_pips: PipDistance::new(target),
            stop_pips: PipDistance::new(stop),
            horizon: HorizonNs::from_minutes(horizon),
        })
        .collect()
    }
}
