use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::calculator::ScoreCalculator;
use super::quadrant::{Quadrant, QuadrantClassifier};
use crate::error::PriorityError;
use crate::types::{round_money, round_score, Money, Score};
use crate::weights::WeightConfig;
use crate::PriorityResult;

/// Lowest legal driver score.
pub const SCORE_RANGE_MIN: Score = dec!(1);

/// Highest legal driver score.
pub const SCORE_RANGE_MAX: Score = dec!(10);

// ---------------------------------------------------------------------------
// Input / output records
// ---------------------------------------------------------------------------

/// Raw driver scores and financial baseline of one portfolio company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInputScores {
    /// 1-10
    pub ebitda_impact: Score,
    /// 1-10
    pub revenue_enablement: Score,
    /// 1-10
    pub risk_reduction: Score,
    /// 1-10
    pub organizational_capacity: Score,
    /// 1-10
    pub data_availability: Score,
    /// 1-10
    pub tech_infrastructure: Score,
    /// 1-10
    pub timeline_fit: Score,
    /// Trailing EBITDA in base currency units
    pub ebitda: Money,
    /// 1-10; the configured default (5) applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_potential: Option<Score>,
}

impl CompanyInputScores {
    /// The seven driver scores by field name, in declaration order.
    pub fn drivers(&self) -> [(&'static str, Score); 7] {
        [
            ("ebitda_impact", self.ebitda_impact),
            ("revenue_enablement", self.revenue_enablement),
            ("risk_reduction", self.risk_reduction),
            ("organizational_capacity", self.organizational_capacity),
            ("data_availability", self.data_availability),
            ("tech_infrastructure", self.tech_infrastructure),
            ("timeline_fit", self.timeline_fit),
        ]
    }

    /// Driver scores (and replication potential, when present) outside [1, 10].
    pub fn out_of_range_scores(&self) -> Vec<(&'static str, Score)> {
        let mut out: Vec<(&'static str, Score)> = self
            .drivers()
            .into_iter()
            .filter(|(_, s)| !validate_score(*s))
            .collect();
        if let Some(r) = self.replication_potential {
            if !validate_score(r) {
                out.push(("replication_potential", r));
            }
        }
        out
    }

    pub fn replication_or(&self, default: Score) -> Score {
        self.replication_potential.unwrap_or(default)
    }
}

/// Every derived metric of one company, rounded to its published precision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedCompanyScores {
    /// 4 dp
    pub value_score: Score,
    /// 4 dp
    pub readiness_score: Score,
    /// 4 dp
    pub priority_score: Score,
    /// Estimated annual EBITDA lift from AI initiatives (cents)
    pub adjusted_ebitda: Money,
    /// Priority score weighted by financial magnitude (cents)
    pub adjusted_priority: Money,
    /// Adjusted priority inflated by the replication bonus (cents)
    pub portfolio_adjusted_priority: Money,
    pub quadrant: Quadrant,
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

/// Runs the per-company pipeline in dependency order and produces one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanyRecordAssembler {
    calculator: ScoreCalculator,
    classifier: QuadrantClassifier,
}

impl CompanyRecordAssembler {
    pub fn new(weights: WeightConfig) -> Self {
        Self {
            calculator: ScoreCalculator::new(weights),
            classifier: QuadrantClassifier::from_weights(&weights),
        }
    }

    pub fn weights(&self) -> &WeightConfig {
        self.calculator.weights()
    }

    pub fn calculator(&self) -> &ScoreCalculator {
        &self.calculator
    }

    /// Replication potential the pipeline uses for `input`.
    pub fn effective_replication(&self, input: &CompanyInputScores) -> Score {
        input.replication_or(self.weights().default_replication_potential)
    }

    /// Score one company. Deterministic: identical input always yields an
    /// identical record. Intermediate values keep full precision; rounding is
    /// applied once per output field and the quadrant is classified on the
    /// unrounded value and readiness scores.
    ///
    /// Fails only with [`PriorityError::Overflow`] when EBITDA is large enough
    /// that a derived product leaves the Decimal range.
    pub fn assemble(&self, input: &CompanyInputScores) -> PriorityResult<CalculatedCompanyScores> {
        let calc = &self.calculator;

        let value_score = calc.calculate_value_score(
            input.ebitda_impact,
            input.revenue_enablement,
            input.risk_reduction,
        )?;
        let readiness_score = calc.calculate_readiness_score(
            input.organizational_capacity,
            input.data_availability,
            input.tech_infrastructure,
            input.timeline_fit,
        )?;
        let priority_score = calc.calculate_priority_score(value_score, readiness_score)?;
        let adjusted_ebitda = calc.calculate_adjusted_ebitda(input.ebitda, value_score)?;
        let adjusted_priority = calc.calculate_adjusted_priority(priority_score, adjusted_ebitda)?;
        let portfolio_adjusted_priority = calc.calculate_portfolio_adjusted_priority(
            priority_score,
            adjusted_ebitda,
            self.effective_replication(input),
        )?;

        Ok(CalculatedCompanyScores {
            value_score: round_score(value_score),
            readiness_score: round_score(readiness_score),
            priority_score: round_score(priority_score),
            adjusted_ebitda: round_money(adjusted_ebitda),
            adjusted_priority: round_money(adjusted_priority),
            portfolio_adjusted_priority: round_money(portfolio_adjusted_priority),
            quadrant: self.classifier.classify(value_score, readiness_score),
        })
    }
}

impl Default for CompanyRecordAssembler {
    fn default() -> Self {
        Self::new(WeightConfig::STANDARD)
    }
}

// ---------------------------------------------------------------------------
// Validation (import boundary only)
// ---------------------------------------------------------------------------

/// `true` iff `1 <= score <= 10`.
pub fn validate_score(score: Score) -> bool {
    score >= SCORE_RANGE_MIN && score <= SCORE_RANGE_MAX
}

/// Strict check for the import / edit path before a record is accepted.
pub fn validate_company_inputs(input: &CompanyInputScores) -> PriorityResult<()> {
    for (field, score) in input.drivers() {
        if !validate_score(score) {
            return Err(PriorityError::InvalidInput {
                field: field.into(),
                reason: format!("Score must be between 1 and 10 (got {score})."),
            });
        }
    }
    if input.ebitda < Decimal::ZERO {
        return Err(PriorityError::InvalidInput {
            field: "ebitda".into(),
            reason: "EBITDA must be non-negative.".into(),
        });
    }
    if let Some(r) = input.replication_potential {
        if r < Decimal::ZERO {
            return Err(PriorityError::InvalidInput {
                field: "replication_potential".into(),
                reason: "Replication potential must be non-negative.".into(),
            });
        }
    }
    Ok(())
}
