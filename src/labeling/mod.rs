//! Multi-dimensional labeling: for every candle, every (target, stop,
//! horizon) configuration in the grid, and both trade directions, compute
//! the forward outcome. This is the highest-throughput stage in the
//! pipeline — grid-parallel over configurations via `rayon`, with the
//! per-candle kernel itself allocation-free.

pub mod kernel;
pub mod outcome;
pub mod table;

pub use kernel::{label_fast, label_reference};
pub use outcome::{Direction, HitKind, LabelOutcome};
pub use table::LabelTable;

use crate::config::{LabelConfig, LabelGrid};
use crate::domain::CandleTable;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One labeled column: which config/direction it belongs to, plus the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledColumn {
    pub config: LabelConfig,
    pub direction: Direction,
    pub table: LabelTable,
}

/// Labels an entire candle table against the full label grid. Each
/// (config, direction) pair becomes one independent column computed on its
/// own rayon task; within a column the kernel walks candles sequentially
/// since a candle's outcome depends only on the candles ahead of it, never
/// on a neighboring column.
pub fn label_candle_table(candles: &CandleTable, grid: &LabelGrid, pip_size: f64) -> Vec<LabeledColumn> {
    label_configs(candles, &grid.expand(), pip_size)
}

/// Same as `label_candle_table`, but over a caller-chosen subset of configs
/// rather than a whole grid's expansion — the seam the orchestrator's
/// checkpointed labeling step chunks over, so a restart can resume past the
/// highest already-flushed chunk instead of relabeling from scratch.
pub fn label_configs(candles: &CandleTable, configs: &[LabelConfig], pip_size: f64) -> Vec<LabeledColumn> {
    let directions = [Direction::Long, Direction::Short];

    crate::trace_time!("labeling::label_configs", 500_000, {
        configs
            .par_iter()
            .flat_map_iter(|config| {
                directions
                    .into_iter()
                    .map(move |direction| label_one_column(candles, config, direction, pip_size))
            })
            .collect()
    })
}

fn label_one_column(
    candles: &CandleTable,
    config: &LabelConfig,
    direction: Direction,
    pip_size: f64,
) -> LabeledColumn {
    let n = candles.len();
    let horizon_ns = *config.horizon;
    let mut table = LabelTable::with_capacity(n);

    for i in 0..n {
        let entry_price = candles.close[i];
        let entry_ts_ns = candles.t_open_ns[i];
        let highs = &candles.high[i + 1..];
        let lows = &candles.low[i + 1..];
        let t_open_ns = &candles.t_open_ns[i + 1..];

        let outcome = label_fast(
            entry_price,
            entry_ts_ns,
            highs,
            lows,
            t_open_ns,
            pip_size,
            direction,
            *config.target_pips,
            *config.stop_pips,
            horizon_ns,
        );
        table.push(outcome);
    }

    LabeledColumn {
        config: config.clone(),
        direction,
        table,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelGrid;
    use crate::domain::{Candle, CandleTable, Universe};

    fn sample_candles() -> CandleTable {
        let mut table = CandleTable::with_universe(Universe::new(5, 20));
        let closes = [1.0000, 1.0005, 1.0010, 1.0002, 0.9995, 1.0020, 1.0030];
        for (i, &c) in closes.iter().enumerate() {
            table.push(Candle::new(
                i as i64 * 300_000_000_000,
                c,
                c + 0.0008,
                c - 0.0008,
                c,
                5,
            ));
        }
        table
    }

    #[test]
    fn labels_every_candle_for_every_config_and_direction() {
        let candles = sample_candles();
        // Candles are 5 minutes apart; 10m/20m horizons span 2/4 bars.
        let grid = LabelGrid::new(vec![10.0, 20.0], vec![10.0], vec![10, 20]);
        let columns = label_candle_table(&candles, &grid, 1e-4);

        // 2 targets * 1 stop * 2 horizons * 2 directions = 8 columns.
        assert_eq!(columns.len(), 8);
        for column in &columns {
            assert_eq!(column.table.len(), candles.len());
        }
    }

    #[test]
    fn last_candles_degrade_to_partial_none_near_data_end() {
        let candles = sample_candles();
        // 50-minute horizon vastly exceeds the ~30 minutes of sample data.
        let grid = LabelGrid::new(vec![50.0], vec![50.0], vec![50]);
        let columns = label_candle_table(&candles, &grid, 1e-4);

        let last_idx = candles.len() - 1;
        let outcome = columns[0].table.get(last_idx);
        assert_eq!(outcome.first_hit, HitKind::None);
        assert_eq!(outcome.bars_to_hit, None);
    }
}
