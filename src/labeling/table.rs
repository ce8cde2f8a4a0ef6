//! Column-oriented storage for one (config, direction) pair's labels across
//! every candle in a universe. `f32` throughout: the full grid runs to
//! hundreds of millions of rows, and a pip-denominated float has no need for
//! `f64` precision.

use crate::labeling::outcome::{HitKind, LabelOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelTable {
    pub first_hit: Vec<u8>,
    /// 0 is used as the "no hit" sentinel; real values are 1-based bar counts.
    pub bars_to_hit: Vec<u32>,
    pub mfe_pips: Vec<f32>,
    pub mae_pips: Vec<f32>,
    pub r_multiple: Vec<f32>,
}

impl LabelTable {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            first_hit: Vec::with_capacity(n),
            bars_to_hit: Vec::with_capacity(n),
            mfe_pips: Vec::with_capacity(n),
            mae_pips: Vec::with_capacity(n),
            r_multiple: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, outcome: LabelOutcome) {
        self.first_hit.push(outcome.first_hit as u8);
        self.bars_to_hit.push(outcome.bars_to_hit.unwrap_or(0));
        self.mfe_pips.push(outcome.mfe_pips as f32);
        self.mae_pips.push(outcome.mae_pips as f32);
        self.r_multiple.push(outcome.r_multiple as f32);
    }

    pub fn len(&self) -> usize {
        self.first_hit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_hit.is_empty()
    }

    pub fn get(&self, idx: usize) -> LabelOutcome {
        let first_hit = match self.first_hit[idx] {
            0 => HitKind::Target,
            1 => HitKind::Stop,
            _ => HitKind::None,
        };
        let bars = self.bars_to_hit[idx];
        LabelOutcome {
            first_hit,
            bars_to_hit: if bars == 0 { None } else { Some(bars) },
            mfe_pips: self.mfe_pips[idx] as f64,
            mae_pips: self.mae_pips[idx] as f64,
            r_multiple: self.r_multiple[idx] as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeling::outcome::Direction;
    use crate::labeling::kernel::label_fast;

    #[test]
    fn round_trips_through_the_columnar_table() {
        let highs = vec![1.0010];
        let lows = vec![0.9995];
        let ts = vec![60_000_000_000];
        let outcome = label_fast(1.0000, 0, &highs, &lows, &ts, 1e-4, Direction::Long, 5.0, 20.0, 180_000_000_000);

        let mut table = LabelTable::with_capacity(1);
        table.push(outcome);

        assert_eq!(table.len(), 1);
        let back = table.get(0);
        assert_eq!(back.first_hit, outcome.first_hit);
        assert_eq!(back.bars_to_hit, outcome.bars_to_hit);
        assert!((back.mfe_pips - outcome.mfe_pips).abs() < 1e-4);
    }
}
