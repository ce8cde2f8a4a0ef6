//! Movement-level classification: buckets the absolute net close-to-close
//! move of a candle, in pips, into the four bands the pattern miner
//! aggregates over.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum MovementLevel {
    Pequeno,
    Medio,
    Grande,
    MuitoGrande,
}

impl MovementLevel {
    /// Classifies the absolute close-to-close move, in pips. Moves under a
    /// single pip are considered noise and excluded from pattern mining
    /// entirely (`None`) — the bands below start at "Pequeno" (1 pip).
    pub fn classify(abs_move_pips: f64) -> Option<Self> {
        if abs_move_pips < 1.0 {
            None
        } else if abs_move_pips <= 5.0 {
            Some(Self::Pequeno)
        } else if abs_move_pips <= 15.0 {
            Some(Self::Medio)
        } else if abs_move_pips <= 30.0 {
            Some(Self::Grande)
        } else {
            Some(Self::MuitoGrande)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pequeno => "pequeno",
            Self::Medio => "medio",
            Self::Grande => "grande",
            Self::MuitoGrande => "muito_grande",
        }
    }

    pub fn all() -> [MovementLevel; 4] {
        [Self::Pequeno, Self::Medio, Self::Grande, Self::MuitoGrande]
    }
}

impl std::fmt::Display for MovementLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_classify_into_the_expected_bands() {
        assert_eq!(MovementLevel::classify(0.5), None);
        assert_eq!(MovementLevel::classify(1.0), Some(MovementLevel::Pequeno));
        assert_eq!(MovementLevel::classify(5.0), Some(MovementLevel::Pequeno));
        assert_eq!(MovementLevel::classify(5.1), Some(MovementLevel::Medio));
        assert_eq!(MovementLevel::classify(15.0), Some(MovementLevel::Medio));
        assert_eq!(MovementLevel::classify(30.0), Some(MovementLevel::Grande));
        assert_eq!(MovementLevel::classify(30.1), Some(MovementLevel::MuitoGrande));
    }
}
