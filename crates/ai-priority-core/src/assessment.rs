//! Per-company AI assessment analytics.
//!
//! An assessment lists quantified benefits, friction points, a prioritized
//! roadmap and an effort/token model for one company. The roll-ups here feed
//! the pass-through fields of the portfolio aggregator via
//! [`CompanyAssessment::financials`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::error::PriorityError;
use crate::portfolio::{AssessmentFinancials, UseCaseSummary};
use crate::types::*;
use crate::PriorityResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Quantified annual benefit of one use case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitLine {
    pub use_case: String,
    pub cost_benefit: Money,
    pub revenue_benefit: Money,
    pub risk_benefit: Money,
    pub cash_flow_benefit: Money,
    /// 0-1
    pub probability_of_success: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrictionPoint {
    /// Business function where the friction sits (e.g. "Finance")
    pub function: String,
    pub severity: PriorityTier,
    pub estimated_annual_cost: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapEntry {
    pub use_case: String,
    pub priority_tier: PriorityTier,
    /// 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_score: Option<Decimal>,
    /// e.g. "Q1", "Q2"
    pub recommended_phase: String,
}

/// Effort and token consumption of one use case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffortLine {
    pub use_case: String,
    /// 1-5
    pub effort_score: Decimal,
    /// 1-5
    pub data_readiness: Decimal,
    /// 1-5
    pub integration_complexity: Decimal,
    /// 1-5
    pub change_management: Decimal,
    pub time_to_value_months: Decimal,
    pub monthly_tokens: Decimal,
    pub annual_token_cost: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyAssessment {
    pub company_name: String,
    #[serde(default)]
    pub benefits: Vec<BenefitLine>,
    #[serde(default)]
    pub friction_points: Vec<FrictionPoint>,
    #[serde(default)]
    pub roadmap: Vec<RoadmapEntry>,
    #[serde(default)]
    pub effort: Vec<EffortLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentInput {
    pub companies: Vec<CompanyAssessment>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitSummary {
    pub total_value: Money,
    pub cost_benefit: Money,
    pub revenue_benefit: Money,
    pub risk_benefit: Money,
    pub cash_flow_benefit: Money,
    /// 4 dp
    pub avg_probability: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrictionSummary {
    pub total_cost: Money,
    pub cost_by_severity: BTreeMap<PriorityTier, Money>,
    pub count_by_severity: BTreeMap<PriorityTier, usize>,
    pub cost_by_function: BTreeMap<String, Money>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffortSummary {
    pub avg_effort_score: Decimal,
    pub avg_data_readiness: Decimal,
    pub avg_integration_complexity: Decimal,
    pub avg_change_management: Decimal,
    pub avg_time_to_value_months: Decimal,
    pub total_annual_token_cost: Money,
    pub total_monthly_tokens: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub count: usize,
    pub use_cases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapSummary {
    pub by_phase: BTreeMap<String, PhaseSummary>,
    pub by_tier: BTreeMap<PriorityTier, usize>,
    /// Over entries carrying a score (4 dp)
    pub avg_priority_score: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiMetrics {
    /// (benefit - cost) / cost, in percent (4 dp)
    pub roi_pct: Decimal,
    /// Months of benefit needed to cover one year of cost (4 dp)
    pub payback_months: Decimal,
    /// benefit / cost (4 dp)
    pub benefit_cost_ratio: Decimal,
}

/// One row of the cross-company comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyComparison {
    pub company_name: String,
    pub total_value: Money,
    pub cost_benefit: Money,
    pub revenue_benefit: Money,
    pub risk_benefit: Money,
    pub use_case_count: usize,
    pub avg_priority_score: Decimal,
    pub critical_count: usize,
    pub friction_cost: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyAssessmentSummary {
    pub company_name: String,
    pub benefits: BenefitSummary,
    pub friction: FrictionSummary,
    pub roadmap: RoadmapSummary,
    pub effort: EffortSummary,
    pub roi: RoiMetrics,
    /// Fields to carry into the portfolio aggregator
    pub financials: AssessmentFinancials,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentOutput {
    pub companies: Vec<CompanyAssessmentSummary>,
    /// Sorted by total value, highest first
    pub comparison: Vec<CompanyComparison>,
}

// ---------------------------------------------------------------------------
// Roll-ups
// ---------------------------------------------------------------------------

pub fn company_benefits(benefits: &[BenefitLine]) -> BenefitSummary {
    let mut s = BenefitSummary::default();
    let mut probability_total = Decimal::ZERO;
    for b in benefits {
        s.cost_benefit += b.cost_benefit;
        s.revenue_benefit += b.revenue_benefit;
        s.risk_benefit += b.risk_benefit;
        s.cash_flow_benefit += b.cash_flow_benefit;
        probability_total += b.probability_of_success;
    }
    s.total_value = s.cost_benefit + s.revenue_benefit + s.risk_benefit + s.cash_flow_benefit;
    s.avg_probability = round_score(average_or_zero(probability_total, benefits.len()));
    s
}

pub fn friction_metrics(points: &[FrictionPoint]) -> FrictionSummary {
    let mut s = FrictionSummary::default();
    for tier in PriorityTier::ALL {
        s.cost_by_severity.insert(tier, Decimal::ZERO);
        s.count_by_severity.insert(tier, 0);
    }
    for p in points {
        s.total_cost += p.estimated_annual_cost;
        *s.cost_by_severity.entry(p.severity).or_insert(Decimal::ZERO) += p.estimated_annual_cost;
        *s.count_by_severity.entry(p.severity).or_insert(0) += 1;
        *s.cost_by_function
            .entry(p.function.clone())
            .or_insert(Decimal::ZERO) += p.estimated_annual_cost;
    }
    s
}

pub fn effort_metrics(effort: &[EffortLine]) -> EffortSummary {
    let n = effort.len();
    let avg = |f: fn(&EffortLine) -> Decimal| -> Decimal {
        round_score(average_or_zero(effort.iter().map(f).sum(), n))
    };
    EffortSummary {
        avg_effort_score: avg(|e| e.effort_score),
        avg_data_readiness: avg(|e| e.data_readiness),
        avg_integration_complexity: avg(|e| e.integration_complexity),
        avg_change_management: avg(|e| e.change_management),
        avg_time_to_value_months: avg(|e| e.time_to_value_months),
        total_annual_token_cost: effort.iter().map(|e| e.annual_token_cost).sum(),
        total_monthly_tokens: effort.iter().map(|e| e.monthly_tokens).sum(),
    }
}

pub fn roadmap_distribution(roadmap: &[RoadmapEntry]) -> RoadmapSummary {
    let mut s = RoadmapSummary::default();
    for tier in PriorityTier::ALL {
        s.by_tier.insert(tier, 0);
    }
    let mut score_total = Decimal::ZERO;
    let mut scored = 0usize;
    for r in roadmap {
        let phase = s.by_phase.entry(r.recommended_phase.clone()).or_default();
        phase.count += 1;
        phase.use_cases.push(r.use_case.clone());
        *s.by_tier.entry(r.priority_tier).or_insert(0) += 1;
        if let Some(score) = r.priority_score {
            score_total += score;
            scored += 1;
        }
    }
    s.avg_priority_score = round_score(average_or_zero(score_total, scored));
    s
}

/// Return on the annual token spend of an AI program. Every ratio is zero
/// when its denominator is zero.
pub fn roi_metrics(total_benefit: Money, annual_token_cost: Money) -> RoiMetrics {
    let roi_pct = (total_benefit - annual_token_cost)
        .checked_div(annual_token_cost)
        .map(|r| r * HUNDRED)
        .unwrap_or(Decimal::ZERO);
    let monthly_benefit = total_benefit / MONTHS_PER_YEAR;
    let payback_months = if monthly_benefit > Decimal::ZERO {
        annual_token_cost / monthly_benefit
    } else {
        Decimal::ZERO
    };
    let benefit_cost_ratio = total_benefit
        .checked_div(annual_token_cost)
        .unwrap_or(Decimal::ZERO);

    RoiMetrics {
        roi_pct: round_score(roi_pct),
        payback_months: round_score(payback_months),
        benefit_cost_ratio: round_score(benefit_cost_ratio),
    }
}

impl CompanyAssessment {
    /// Totals in the shape the portfolio aggregator consumes.
    pub fn financials(&self) -> AssessmentFinancials {
        let benefits = company_benefits(&self.benefits);
        let effort = effort_metrics(&self.effort);
        let friction = friction_metrics(&self.friction_points);
        AssessmentFinancials {
            annual_value: Some(benefits.total_value),
            cost_benefit: Some(benefits.cost_benefit),
            revenue_benefit: Some(benefits.revenue_benefit),
            risk_benefit: Some(benefits.risk_benefit),
            cash_flow_benefit: Some(benefits.cash_flow_benefit),
            monthly_tokens: Some(effort.total_monthly_tokens),
            annual_token_cost: Some(effort.total_annual_token_cost),
            friction_cost: Some(friction.total_cost),
            use_cases: self
                .roadmap
                .iter()
                .map(|r| UseCaseSummary {
                    tier: Some(r.priority_tier),
                    priority_score: r.priority_score,
                })
                .collect(),
        }
    }
}

/// Per-company headline figures, sorted by total value (desc, ties by name).
pub fn company_comparison(assessments: &[CompanyAssessment]) -> Vec<CompanyComparison> {
    let mut rows: Vec<CompanyComparison> = assessments
        .iter()
        .map(|a| {
            let benefits = company_benefits(&a.benefits);
            let roadmap = roadmap_distribution(&a.roadmap);
            CompanyComparison {
                company_name: a.company_name.clone(),
                total_value: benefits.total_value,
                cost_benefit: benefits.cost_benefit,
                revenue_benefit: benefits.revenue_benefit,
                risk_benefit: benefits.risk_benefit,
                use_case_count: a.roadmap.len(),
                avg_priority_score: roadmap.avg_priority_score,
                critical_count: roadmap
                    .by_tier
                    .get(&PriorityTier::Critical)
                    .copied()
                    .unwrap_or(0),
                friction_cost: friction_metrics(&a.friction_points).total_cost,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_value
            .cmp(&a.total_value)
            .then_with(|| a.company_name.cmp(&b.company_name))
    });
    rows
}

/// Roll up every company's assessment and compare them side by side.
pub fn analyze_assessment(
    input: &AssessmentInput,
) -> PriorityResult<ComputationOutput<AssessmentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    for company in &input.companies {
        validate_assessment(company, &mut warnings)?;
    }
    tracing::debug!(companies = input.companies.len(), "Analyzing AI assessments");

    let companies: Vec<CompanyAssessmentSummary> = input
        .companies
        .iter()
        .map(|a| {
            let benefits = company_benefits(&a.benefits);
            let effort = effort_metrics(&a.effort);
            let roi = roi_metrics(benefits.total_value, effort.total_annual_token_cost);
            CompanyAssessmentSummary {
                company_name: a.company_name.clone(),
                friction: friction_metrics(&a.friction_points),
                roadmap: roadmap_distribution(&a.roadmap),
                financials: a.financials(),
                benefits,
                effort,
                roi,
            }
        })
        .collect();

    let output = AssessmentOutput {
        companies,
        comparison: company_comparison(&input.companies),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "total_value": "cost + revenue + risk + cash flow benefit",
        "roi": "(benefit - annual token cost) / annual token cost",
        "payback": "annual token cost / (benefit / 12)",
    });

    Ok(with_metadata(
        "AI assessment roll-up (benefits, friction, roadmap, effort and ROI)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_assessment(a: &CompanyAssessment, warnings: &mut Vec<String>) -> PriorityResult<()> {
    if a.company_name.trim().is_empty() {
        return Err(PriorityError::InvalidInput {
            field: "company_name".into(),
            reason: "Company name must not be empty.".into(),
        });
    }
    for b in &a.benefits {
        if b.probability_of_success < Decimal::ZERO || b.probability_of_success > Decimal::ONE {
            return Err(PriorityError::InvalidInput {
                field: format!("{}.benefits.{}.probability_of_success", a.company_name, b.use_case),
                reason: "Probability of success must be between 0 and 1.".into(),
            });
        }
    }
    for f in &a.friction_points {
        if f.estimated_annual_cost < Decimal::ZERO {
            return Err(PriorityError::InvalidInput {
                field: format!("{}.friction_points.{}", a.company_name, f.function),
                reason: "Friction cost must be non-negative.".into(),
            });
        }
    }
    for e in &a.effort {
        if e.annual_token_cost < Decimal::ZERO || e.monthly_tokens < Decimal::ZERO {
            return Err(PriorityError::InvalidInput {
                field: format!("{}.effort.{}", a.company_name, e.use_case),
                reason: "Token volume and cost must be non-negative.".into(),
            });
        }
    }
    for r in &a.roadmap {
        match r.priority_score {
            Some(score) if score < Decimal::ZERO || score > HUNDRED => {
                tracing::warn!(
                    company = %a.company_name,
                    use_case = %r.use_case,
                    %score,
                    "Roadmap priority outside 0-100"
                );
                warnings.push(format!(
                    "{}: roadmap priority {score} for '{}' is outside 0-100.",
                    a.company_name, r.use_case
                ));
            }
            None => warnings.push(format!(
                "{}: '{}' has no numeric priority score and is left out of averages.",
                a.company_name, r.use_case
            )),
            _ => {}
        }
    }
    Ok(())
}
