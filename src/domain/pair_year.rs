//! Parsing of the `PAIR_YEAR` identifier that names every input tick file and
//! seeds the cache fingerprint prefix (spec sections 6 and 9).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency pairs quoted in yen use a 2-decimal pip; everything else uses 4.
const JPY_QUOTE: &str = "JPY";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairYear {
    pub pair: String,
    pub year: u16,
}

impl PairYear {
    pub fn new(pair: impl Into<String>, year: u16) -> Self {
        Self {
            pair: pair.into(),
            year,
        }
    }

    /// Parses a `PAIR_YEAR` stem such as `EURUSD_2023` or `USDJPY_2021`.
    pub fn parse(stem: &str) -> Option<Self> {
        let (pair, year_str) = stem.rsplit_once('_')?;
        if pair.len() < 6 {
            return None;
        }
        let year: u16 = year_str.parse().ok()?;
        Some(Self::new(pair.to_uppercase(), year))
    }

    /// One pip in price units for this pair.
    pub fn pip_size(&self) -> f64 {
        if self.pair.ends_with(JPY_QUOTE) {
            1e-2
        } else {
            1e-4
        }
    }

    /// Cache key prefix derived from the pair/year, e.g. `EURUSD_2023`.
    pub fn cache_prefix(&self) -> String {
        format!("{}_{}", self.pair, self.year)
    }
}

impl fmt::Display for PairYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.pair, self.year)
    }
}
