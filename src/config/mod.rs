// Research engine configuration: value-object newtypes, the label grid, and
// the immutable RunConfig assembled once per run.

mod debug;
mod grid;
mod run_config;
mod types;

pub use debug::DEBUG_FLAGS;
pub use grid::{LabelConfig, LabelGrid};
pub use run_config::{
    FeatureWindows, PersistencePaths, RankerWeights, RegimeConfig, RunConfig, RunConfigBuilder,
    StrategyConstraints,
};
pub use types::{CooldownMinutes, HorizonNs, LotSize, MaxTradesPerDay, PipDistance, RMultiple, RankerWeight};
