use serde::{Deserialize, Serialize};

use crate::types::Score;
use crate::weights::WeightConfig;

/// Value-Readiness matrix placement of a company
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    /// High value, high readiness
    Champions,
    /// Lower value, high readiness
    #[serde(rename = "Quick Wins")]
    QuickWins,
    /// High value, lower readiness
    Strategic,
    /// Lower value, lower readiness
    Foundations,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::Champions,
        Quadrant::QuickWins,
        Quadrant::Strategic,
        Quadrant::Foundations,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::Champions => "Champions",
            Quadrant::QuickWins => "Quick Wins",
            Quadrant::Strategic => "Strategic",
            Quadrant::Foundations => "Foundations",
        }
    }
}

impl std::fmt::Display for Quadrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps a (value, readiness) pair onto the four quadrants.
///
/// The threshold is inclusive: a score exactly on it counts as "High".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadrantClassifier {
    threshold: Score,
}

impl QuadrantClassifier {
    pub const fn new(threshold: Score) -> Self {
        Self { threshold }
    }

    pub fn from_weights(weights: &WeightConfig) -> Self {
        Self::new(weights.quadrant_threshold)
    }

    pub fn threshold(&self) -> Score {
        self.threshold
    }

    pub fn classify(&self, value_score: Score, readiness_score: Score) -> Quadrant {
        determine_quadrant(value_score, readiness_score, self.threshold)
    }
}

impl Default for QuadrantClassifier {
    fn default() -> Self {
        Self::from_weights(&WeightConfig::STANDARD)
    }
}

pub fn determine_quadrant(
    value_score: Score,
    readiness_score: Score,
    threshold: Score,
) -> Quadrant {
    let high_value = value_score >= threshold;
    let high_readiness = readiness_score >= threshold;

    match (high_value, high_readiness) {
        (true, true) => Quadrant::Champions,
        (false, true) => Quadrant::QuickWins,
        (true, false) => Quadrant::Strategic,
        (false, false) => Quadrant::Foundations,
    }
}
