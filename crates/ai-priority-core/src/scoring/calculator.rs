use rust_decimal::Decimal;

use crate::error::PriorityError;
use crate::types::{Money, Score};
use crate::weights::WeightConfig;
use crate::PriorityResult;

/// Pure arithmetic for every derived metric of a single company.
///
/// All methods accept any decimal input (including values outside the
/// nominal 1-10 driver range) and extrapolate linearly. Range checking
/// happens at the import boundary via
/// [`validate_score`](super::assembler::validate_score), never here. The only
/// error is [`PriorityError::Overflow`], when a product leaves the 96-bit
/// Decimal range.
///
/// Results are returned at full precision; the assembler rounds each derived
/// score exactly once when it becomes part of a company record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreCalculator {
    weights: WeightConfig,
}

impl ScoreCalculator {
    pub const fn new(weights: WeightConfig) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &WeightConfig {
        &self.weights
    }

    /// Value_Score = EBITDA_Impact×0.50 + Revenue_Enablement×0.25 + Risk_Reduction×0.25
    pub fn calculate_value_score(
        &self,
        ebitda_impact: Score,
        revenue_enablement: Score,
        risk_reduction: Score,
    ) -> PriorityResult<Score> {
        let w = &self.weights.value;
        weighted_sum(
            "value_score",
            &[
                (ebitda_impact, w.ebitda_impact),
                (revenue_enablement, w.revenue_enablement),
                (risk_reduction, w.risk_reduction),
            ],
        )
    }

    /// Readiness_Score = Org×0.35 + Data×0.35 + Tech×0.20 + Timeline×0.10
    pub fn calculate_readiness_score(
        &self,
        org_capacity: Score,
        data_quality: Score,
        tech_infrastructure: Score,
        timeline_fit: Score,
    ) -> PriorityResult<Score> {
        let w = &self.weights.readiness;
        weighted_sum(
            "readiness_score",
            &[
                (org_capacity, w.org_capacity),
                (data_quality, w.data_quality),
                (tech_infrastructure, w.tech_infrastructure),
                (timeline_fit, w.timeline_fit),
            ],
        )
    }

    /// Priority_Score = Value_Score×0.50 + Readiness_Score×0.50
    ///
    /// Takes already-computed value and readiness scores, not raw drivers.
    pub fn calculate_priority_score(
        &self,
        value_score: Score,
        readiness_score: Score,
    ) -> PriorityResult<Score> {
        let w = &self.weights.priority;
        weighted_sum(
            "priority_score",
            &[(value_score, w.value), (readiness_score, w.readiness)],
        )
    }

    /// Adjusted_EBITDA = EBITDA × 0.15 × (Value_Score / 7)
    ///
    /// A value score equal to the normalization anchor yields exactly the
    /// base-assumption share of EBITDA; the lift scales linearly either side.
    /// A zero anchor yields zero.
    pub fn calculate_adjusted_ebitda(
        &self,
        ebitda: Money,
        value_score: Score,
    ) -> PriorityResult<Money> {
        let anchor = self.weights.ebitda_normalization_anchor;
        let relative_value = if anchor.is_zero() {
            Decimal::ZERO
        } else {
            value_score
                .checked_div(anchor)
                .ok_or_else(|| overflow("adjusted_ebitda"))?
        };
        let adjusted_lift = checked_mul(
            "adjusted_ebitda",
            self.weights.ebitda_base_assumption,
            relative_value,
        )?;
        checked_mul("adjusted_ebitda", ebitda, adjusted_lift)
    }

    /// Adjusted_Priority = Priority_Score × Adjusted_EBITDA
    ///
    /// A scaling multiplier, not a percentage: the result is not bounded by
    /// the adjusted EBITDA.
    pub fn calculate_adjusted_priority(
        &self,
        priority_score: Score,
        adjusted_ebitda: Money,
    ) -> PriorityResult<Money> {
        checked_mul("adjusted_priority", priority_score, adjusted_ebitda)
    }

    /// Portfolio_Adjusted_Priority =
    ///     (Priority_Score × Adjusted_EBITDA) × (1 + Replication × 0.10)
    ///
    /// Recomputes the base product itself so it never depends on a separately
    /// rounded adjusted priority. Any non-negative replication potential is
    /// accepted; zero leaves the base product unchanged.
    pub fn calculate_portfolio_adjusted_priority(
        &self,
        priority_score: Score,
        adjusted_ebitda: Money,
        replication_potential: Score,
    ) -> PriorityResult<Money> {
        const CONTEXT: &str = "portfolio_adjusted_priority";
        let adjusted_priority = checked_mul(CONTEXT, priority_score, adjusted_ebitda)?;
        let bonus = checked_mul(
            CONTEXT,
            replication_potential,
            self.weights.replication_multiplier,
        )?;
        let replication_bonus = Decimal::ONE
            .checked_add(bonus)
            .ok_or_else(|| overflow(CONTEXT))?;
        checked_mul(CONTEXT, adjusted_priority, replication_bonus)
    }
}

fn overflow(context: &str) -> PriorityError {
    PriorityError::Overflow {
        context: context.to_string(),
    }
}

fn checked_mul(context: &str, a: Decimal, b: Decimal) -> PriorityResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(context))
}

fn weighted_sum(context: &str, terms: &[(Score, Decimal)]) -> PriorityResult<Score> {
    terms.iter().try_fold(Decimal::ZERO, |acc, (score, weight)| {
        let term = checked_mul(context, *score, *weight)?;
        acc.checked_add(term).ok_or_else(|| overflow(context))
    })
}
