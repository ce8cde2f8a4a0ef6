//! The run-wide immutable configuration. Built once per invocation of the
//! `research` binary and passed by value into every component, replacing the
//! mutable globals a live-trading engine needs but a batch pipeline does not.

use crate::config::grid::LabelGrid;
use crate::config::types::{CooldownMinutes, MaxTradesPerDay, RankerWeight};
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankerWeights {
    pub sharpe: RankerWeight,
    pub sortino: RankerWeight,
    pub calmar: RankerWeight,
    pub max_drawdown: RankerWeight,
    pub ulcer: RankerWeight,
    pub win_rate: RankerWeight,
    pub profit_factor: RankerWeight,
}

impl Default for RankerWeights {
    fn default() -> Self {
        Self {
            sharpe: RankerWeight::new(1.0),
            sortino: RankerWeight::new(0.75),
            calmar: RankerWeight::new(0.5),
            max_drawdown: RankerWeight::new(0.75),
            ulcer: RankerWeight::new(0.5),
            win_rate: RankerWeight::new(0.25),
            profit_factor: RankerWeight::new(0.75),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureWindows {
    pub short: usize,
    pub medium: usize,
    pub long: usize,
}

impl Default for FeatureWindows {
    fn default() -> Self {
        Self {
            short: 20,
            medium: 60,
            long: 240,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeConfig {
    pub k_min: usize,
    pub k_max: usize,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self { k_min: 2, k_max: 6 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConstraints {
    pub min_cooldown: CooldownMinutes,
    pub max_trades_per_day: MaxTradesPerDay,
    pub min_risk_reward: f64,
}

impl Default for StrategyConstraints {
    fn default() -> Self {
        Self {
            min_cooldown: CooldownMinutes(15),
            max_trades_per_day: MaxTradesPerDay(6),
            min_risk_reward: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistencePaths {
    pub cache_root: PathBuf,
    pub ledger_path: PathBuf,
}

impl Default for PersistencePaths {
    fn default() -> Self {
        Self {
            cache_root: PathBuf::from("cache"),
            ledger_path: PathBuf::from("cache/progress.json"),
        }
    }
}

/// The fully resolved, immutable configuration for one run of the engine.
/// Never mutated after construction: every component takes a clone (cheap —
/// mostly `Vec<f64>`/small structs) or a borrow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub interval_minutes: u32,
    pub lookback_periods: u32,
    pub label_grid: LabelGrid,
    pub feature_windows: FeatureWindows,
    pub regime: RegimeConfig,
    pub strategy: StrategyConstraints,
    pub ranker_weights: RankerWeights,
    pub min_trades_for_ranking: u32,
    pub persistence: PersistencePaths,
    pub force_rerun: bool,
}

impl RunConfig {
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }
}

/// Layers compiled-in defaults, then an optional TOML file, then explicit CLI
/// overrides, in that order — mirroring the teacher's documented override
/// chain for cache-prefix flags.
#[derive(Debug, Clone, Default)]
pub struct RunConfigBuilder {
    interval_minutes: Option<u32>,
    lookback_periods: Option<u32>,
    label_grid: Option<LabelGrid>,
    feature_windows: Option<FeatureWindows>,
    regime: Option<RegimeConfig>,
    strategy: Option<StrategyConstraints>,
    ranker_weights: Option<RankerWeights>,
    min_trades_for_ranking: Option<u32>,
    cache_root: Option<PathBuf>,
    force_rerun: Option<bool>,
}

impl RunConfigBuilder {
    /// Loads overrides from a TOML file. Missing fields keep their current
    /// value; unknown sections are ignored so the file can carry comments and
    /// forward-looking keys a given build does not yet understand.
    pub fn with_toml_file(mut self, contents: &str) -> anyhow::Result<Self> {
        let raw: RunConfigToml = toml_like_parse(contents)?;
        if let Some(v) = raw.interval_minutes {
            self.interval_minutes = Some(v);
        }
        if let Some(v) = raw.lookback_periods {
            self.lookback_periods = Some(v);
        }
        if let Some(v) = raw.min_trades_for_ranking {
            self.min_trades_for_ranking = Some(v);
        }
        Ok(self)
    }

    pub fn with_cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache_root = Some(root.into());
        self
    }

    pub fn with_force_rerun(mut self, force: bool) -> Self {
        self.force_rerun = Some(force);
        self
    }

    pub fn with_label_grid(mut self, grid: LabelGrid) -> Self {
        self.label_grid = Some(grid);
        self
    }

    pub fn build(self) -> RunConfig {
        let cache_root = self.cache_root.unwrap_or_else(|| PathBuf::from("cache"));
        let ledger_path = cache_root.join("progress.json");

        RunConfig {
            interval_minutes: self.interval_minutes.unwrap_or(5),
            lookback_periods: self.lookback_periods.unwrap_or(20),
            label_grid: self.label_grid.unwrap_or_else(LabelGrid::default_grid),
            feature_windows: self.feature_windows.unwrap_or_default(),
            regime: self.regime.unwrap_or_default(),
            strategy: self.strategy.unwrap_or_default(),
            ranker_weights: self.ranker_weights.unwrap_or_default(),
            min_trades_for_ranking: self.min_trades_for_ranking.unwrap_or(50),
            persistence: PersistencePaths {
                cache_root,
                ledger_path,
            },
            force_rerun: self.force_rerun.unwrap_or(false),
        }
    }
}

/// Minimal subset of a config file the builder understands. A real TOML
/// parse (via `toml`) would deserialize into this directly; kept as a plain
/// struct here so the builder has a single typed seam regardless of which
/// parser backs it.
#[derive(Debug, Default, Deserialize)]
struct RunConfigToml {
    interval_minutes: Option<u32>,
    lookback_periods: Option<u32>,
    min_trades_for_ranking: Option<u32>,
}

fn toml_like_parse(contents: &str) -> anyhow::Result<RunConfigToml> {
    toml::from_str(contents).map_err(|e| EngineError::Config(format!("invalid config file: {e}")).into())
}
