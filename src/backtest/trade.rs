//! One resolved trade record.

use crate::labeling::Direction;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Stop,
    Target,
    Signal,
    Timeout,
}

#[derive(Debug, Clone)]
pub struct Trade {
    pub id: String,
    pub direction: Direction,
    pub entry_idx: usize,
    pub exit_idx: usize,
    pub entry_price: f64,
    pub exit_price: f64,
    pub stop_price: f64,
    pub target_price: f64,
    pub exit_reason: ExitReason,
    pub lot_size: f64,
    pub pnl_pips: f64,
    pub pnl_usd: f64,
}

impl Trade {
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }
}
