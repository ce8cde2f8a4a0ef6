//! The strategy factory (component F): a template registry, parameter and
//! risk grids, and the shared cooldown/daily-cap invariant layer every
//! template signal passes through before it reaches the backtester.

pub mod instance;
pub mod invariants;
pub mod registry;
pub mod templates;

pub use instance::{RiskParams, StrategyInstance};
pub use invariants::enforce_invariants;
pub use registry::enumerate_strategies;
