use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PriorityError;
use crate::types::{Rate, Score, Weight};
use crate::PriorityResult;

/// Maximum distance from 1.0 tolerated when checking that a weight group sums to one.
pub const WEIGHT_SUM_TOLERANCE: Decimal = dec!(0.000000001);

// ---------------------------------------------------------------------------
// Weight groups
// ---------------------------------------------------------------------------

/// Coefficients of the Value Score blend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueWeights {
    pub ebitda_impact: Weight,
    pub revenue_enablement: Weight,
    pub risk_reduction: Weight,
}

impl ValueWeights {
    pub fn sum(&self) -> Decimal {
        self.ebitda_impact + self.revenue_enablement + self.risk_reduction
    }

    fn terms(&self) -> [(&'static str, Weight); 3] {
        [
            ("ebitda_impact", self.ebitda_impact),
            ("revenue_enablement", self.revenue_enablement),
            ("risk_reduction", self.risk_reduction),
        ]
    }
}

/// Coefficients of the Readiness Score blend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessWeights {
    pub org_capacity: Weight,
    pub data_quality: Weight,
    pub tech_infrastructure: Weight,
    pub timeline_fit: Weight,
}

impl ReadinessWeights {
    pub fn sum(&self) -> Decimal {
        self.org_capacity + self.data_quality + self.tech_infrastructure + self.timeline_fit
    }

    fn terms(&self) -> [(&'static str, Weight); 4] {
        [
            ("org_capacity", self.org_capacity),
            ("data_quality", self.data_quality),
            ("tech_infrastructure", self.tech_infrastructure),
            ("timeline_fit", self.timeline_fit),
        ]
    }
}

/// Coefficients of the Priority Score blend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityWeights {
    pub value: Weight,
    pub readiness: Weight,
}

impl PriorityWeights {
    pub fn sum(&self) -> Decimal {
        self.value + self.readiness
    }

    fn terms(&self) -> [(&'static str, Weight); 2] {
        [("value", self.value), ("readiness", self.readiness)]
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Versioned table of every formula coefficient the engine reads.
///
/// A configuration is a plain value: the calculator takes its own copy at
/// construction and nothing mutates it afterwards, so alternate tables can be
/// used side by side (e.g. in scenario comparisons or tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightConfig {
    pub version: u32,
    pub value: ValueWeights,
    pub readiness: ReadinessWeights,
    pub priority: PriorityWeights,
    /// Share of EBITDA an AI program lifts at the anchor value score (Bain midpoint)
    pub ebitda_base_assumption: Rate,
    /// Value score at which the adjusted EBITDA equals exactly the base assumption
    pub ebitda_normalization_anchor: Score,
    /// Bonus per replication-potential point on the portfolio-adjusted priority
    pub replication_multiplier: Rate,
    /// Inclusive cut-off for "High" value / readiness in quadrant placement
    pub quadrant_threshold: Score,
    /// Replication potential assumed when a company has none recorded
    pub default_replication_potential: Score,
    /// Replication potential at or above which a company is a platform play
    pub platform_threshold: Score,
}

impl WeightConfig {
    pub const STANDARD: WeightConfig = WeightConfig {
        version: 1,
        value: ValueWeights {
            ebitda_impact: dec!(0.50),
            revenue_enablement: dec!(0.25),
            risk_reduction: dec!(0.25),
        },
        readiness: ReadinessWeights {
            org_capacity: dec!(0.35),
            data_quality: dec!(0.35),
            tech_infrastructure: dec!(0.20),
            timeline_fit: dec!(0.10),
        },
        priority: PriorityWeights {
            value: dec!(0.50),
            readiness: dec!(0.50),
        },
        ebitda_base_assumption: dec!(0.15),
        ebitda_normalization_anchor: dec!(7.0),
        replication_multiplier: dec!(0.10),
        quadrant_threshold: dec!(7.0),
        default_replication_potential: dec!(5),
        platform_threshold: dec!(7),
    };

    /// Parse an alternate weight table from JSON and validate it.
    pub fn from_json(json: &str) -> PriorityResult<Self> {
        let config: WeightConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the structural invariants every table must satisfy.
    pub fn validate(&self) -> PriorityResult<()> {
        check_group("value", self.value.sum(), &self.value.terms())?;
        check_group("readiness", self.readiness.sum(), &self.readiness.terms())?;
        check_group("priority", self.priority.sum(), &self.priority.terms())?;

        if self.ebitda_normalization_anchor <= Decimal::ZERO {
            return Err(PriorityError::InvalidConfiguration(format!(
                "ebitda_normalization_anchor must be positive (got {}).",
                self.ebitda_normalization_anchor
            )));
        }
        if self.ebitda_base_assumption < Decimal::ZERO {
            return Err(PriorityError::InvalidConfiguration(
                "ebitda_base_assumption must be non-negative.".into(),
            ));
        }
        if self.replication_multiplier < Decimal::ZERO {
            return Err(PriorityError::InvalidConfiguration(
                "replication_multiplier must be non-negative.".into(),
            ));
        }
        if self.default_replication_potential < Decimal::ZERO {
            return Err(PriorityError::InvalidConfiguration(
                "default_replication_potential must be non-negative.".into(),
            ));
        }
        if self.platform_threshold < Decimal::ZERO {
            return Err(PriorityError::InvalidConfiguration(
                "platform_threshold must be non-negative.".into(),
            ));
        }
        Ok(())
    }
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

fn check_group(group: &str, sum: Decimal, terms: &[(&'static str, Weight)]) -> PriorityResult<()> {
    if let Some((name, _)) = terms.iter().find(|(_, w)| *w < Decimal::ZERO) {
        return Err(PriorityError::InvalidConfiguration(format!(
            "{group}.{name} must be non-negative."
        )));
    }
    if (sum - Decimal::ONE).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(PriorityError::InvalidConfiguration(format!(
            "{group} weights must sum to 1.0 (got {sum})."
        )));
    }
    Ok(())
}
