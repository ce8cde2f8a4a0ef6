//! The pattern miner (component E): classifies each candle's movement,
//! encodes its shape, and aggregates occurrences within every (regime,
//! movement level, direction) bucket into a JSON-serializable catalog,
//! plus a global feature-importance ranking.

pub mod catalog;
pub mod movement;
pub mod signature;

pub use catalog::{mine_patterns, FeatureStat, LevelDirectionSummary, MiningInput, PatternCatalog, PatternRecord};
pub use movement::MovementLevel;
pub use signature::candle_signature;
