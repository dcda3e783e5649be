use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;

use super::assembler::{CalculatedCompanyScores, CompanyInputScores, CompanyRecordAssembler};
use crate::error::PriorityError;
use crate::portfolio::{
    aggregate_portfolio, AssessmentFinancials, PortfolioMetrics, PortfolioRecord,
};
use crate::types::*;
use crate::weights::WeightConfig;
use crate::PriorityResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// A portfolio company as entered by the deal team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_name: String,
    /// Sector bucket used for portfolio breakdowns (e.g. "Healthcare Services")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<ValueTheme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<HoldPeriodTrack>,
    /// Explicit classification; derived from replication potential when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_classification: Option<PlatformClassification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_date: Option<NaiveDate>,
    pub scores: CompanyInputScores,
    #[serde(default)]
    pub assessment: AssessmentFinancials,
}

/// Input for scoring a full roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterInput {
    pub companies: Vec<CompanyProfile>,
    /// Alternate weight table; the standard table applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<WeightConfig>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A profile together with its derived metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCompany {
    pub profile: CompanyProfile,
    /// Replication potential the pipeline actually used
    pub replication_potential: Score,
    pub scores: CalculatedCompanyScores,
}

impl From<&ScoredCompany> for PortfolioRecord {
    fn from(company: &ScoredCompany) -> Self {
        let p = &company.profile;
        PortfolioRecord {
            company_name: p.company_name.clone(),
            investment_category: p.investment_category.clone(),
            theme: p.theme,
            track: p.track,
            ebitda: Some(p.scores.ebitda),
            scores: Some(company.scores.clone()),
            assessment: p.assessment.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterOutput {
    /// Scored companies in input order
    pub companies: Vec<ScoredCompany>,
    pub portfolio: PortfolioMetrics,
    pub weights_version: u32,
    /// The table every company was scored with, for downstream frameworks
    pub weights: WeightConfig,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score every company on a roster and aggregate the portfolio.
///
/// Scores outside the nominal 1-10 range are scored as given and reported as
/// warnings. Structurally invalid input is rejected: a bad weight table, a
/// blank name, negative EBITDA or replication potential, or an EBITDA so large
/// that a derived metric overflows.
pub fn score_roster(input: &RosterInput) -> PriorityResult<ComputationOutput<RosterOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let weights = input.weights.unwrap_or(WeightConfig::STANDARD);
    weights.validate()?;
    validate_roster(&input.companies, &mut warnings)?;

    tracing::debug!(
        companies = input.companies.len(),
        weights_version = weights.version,
        "Scoring roster"
    );

    let assembler = CompanyRecordAssembler::new(weights);
    let companies = score_companies(&assembler, &input.companies)?;

    let records: Vec<PortfolioRecord> = companies.iter().map(PortfolioRecord::from).collect();
    let aggregate = aggregate_portfolio(&records);
    warnings.extend(aggregate.warnings);

    let output = RosterOutput {
        companies,
        portfolio: aggregate.result,
        weights_version: weights.version,
        weights,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "weights": weights,
        "rounding": "scores 4 dp, money 2 dp, half away from zero, applied once per output",
        "quadrant_threshold_inclusive": true,
        "default_replication_potential": weights.default_replication_potential.to_string(),
    });

    Ok(with_metadata(
        "Value-Readiness scoring with EBITDA translation and portfolio amplification",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Run the per-company pipeline over `profiles`, preserving input order.
#[cfg(not(feature = "parallel"))]
pub fn score_companies(
    assembler: &CompanyRecordAssembler,
    profiles: &[CompanyProfile],
) -> PriorityResult<Vec<ScoredCompany>> {
    profiles.iter().map(|p| score_one(assembler, p)).collect()
}

/// Run the per-company pipeline over `profiles` on the rayon pool,
/// preserving input order.
#[cfg(feature = "parallel")]
pub fn score_companies(
    assembler: &CompanyRecordAssembler,
    profiles: &[CompanyProfile],
) -> PriorityResult<Vec<ScoredCompany>> {
    use rayon::prelude::*;

    profiles.par_iter().map(|p| score_one(assembler, p)).collect()
}

fn score_one(
    assembler: &CompanyRecordAssembler,
    profile: &CompanyProfile,
) -> PriorityResult<ScoredCompany> {
    let scores = assembler.assemble(&profile.scores).map_err(|e| match e {
        PriorityError::Overflow { context } => PriorityError::Overflow {
            context: format!("{context} for '{}'", profile.company_name.trim()),
        },
        other => other,
    })?;
    Ok(ScoredCompany {
        profile: profile.clone(),
        replication_potential: assembler.effective_replication(&profile.scores),
        scores,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_roster(companies: &[CompanyProfile], warnings: &mut Vec<String>) -> PriorityResult<()> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();

    for (i, company) in companies.iter().enumerate() {
        let name = company.company_name.trim();
        if name.is_empty() {
            return Err(PriorityError::InvalidInput {
                field: format!("companies[{i}].company_name"),
                reason: "Company name must not be empty.".into(),
            });
        }
        if company.scores.ebitda < Decimal::ZERO {
            return Err(PriorityError::InvalidInput {
                field: format!("companies[{i}].scores.ebitda"),
                reason: "EBITDA must be non-negative.".into(),
            });
        }
        if matches!(company.scores.replication_potential, Some(r) if r < Decimal::ZERO) {
            return Err(PriorityError::InvalidInput {
                field: format!("companies[{i}].scores.replication_potential"),
                reason: "Replication potential must be non-negative.".into(),
            });
        }

        for (field, score) in company.scores.out_of_range_scores() {
            tracing::warn!(company = %name, field, %score, "Driver score outside 1-10");
            warnings.push(format!(
                "{name}: {field} = {score} is outside the 1-10 range; scored as given."
            ));
        }
        if !seen.insert(name) {
            warnings.push(format!("Duplicate company name '{name}' on roster."));
        }
    }

    if companies.is_empty() {
        tracing::warn!("Scoring an empty roster");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Quadrant;
    use rust_decimal_macros::dec;

    fn profile(name: &str, score: Decimal) -> CompanyProfile {
        CompanyProfile {
            company_name: name.into(),
            investment_category: None,
            theme: None,
            track: None,
            platform_classification: None,
            investment_date: None,
            scores: CompanyInputScores {
                ebitda_impact: score,
                revenue_enablement: score,
                risk_reduction: score,
                organizational_capacity: score,
                data_availability: score,
                tech_infrastructure: score,
                timeline_fit: score,
                ebitda: dec!(10_000_000),
                replication_potential: None,
            },
            assessment: AssessmentFinancials::default(),
        }
    }

    #[test]
    fn test_roster_scores_in_input_order() {
        let input = RosterInput {
            companies: vec![profile("Beta", dec!(8)), profile("Alpha", dec!(4))],
            weights: None,
        };
        let out = score_roster(&input).unwrap();
        let names: Vec<&str> = out
            .result
            .companies
            .iter()
            .map(|c| c.profile.company_name.as_str())
            .collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
        assert_eq!(out.result.companies[0].scores.quadrant, Quadrant::Champions);
        assert_eq!(out.result.companies[1].scores.quadrant, Quadrant::Foundations);
        assert_eq!(out.result.companies[0].replication_potential, dec!(5));
        assert_eq!(out.result.portfolio.total_companies, 2);
        assert_eq!(out.result.weights_version, 1);
        assert_eq!(out.result.weights, WeightConfig::STANDARD);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_out_of_range_driver_warns_but_scores() {
        let mut p = profile("Gamma", dec!(6));
        p.scores.timeline_fit = dec!(12);
        let out = score_roster(&RosterInput { companies: vec![p], weights: None }).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("timeline_fit"));
        assert_eq!(out.result.companies.len(), 1);
    }

    #[test]
    fn test_blank_name_rejected() {
        let input = RosterInput { companies: vec![profile("  ", dec!(5))], weights: None };
        match score_roster(&input) {
            Err(PriorityError::InvalidInput { field, .. }) => {
                assert_eq!(field, "companies[0].company_name")
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_ebitda_rejected() {
        let mut p = profile("Delta", dec!(5));
        p.scores.ebitda = dec!(-1);
        assert!(score_roster(&RosterInput { companies: vec![p], weights: None }).is_err());
    }

    #[test]
    fn test_invalid_weight_table_rejected() {
        let mut w = WeightConfig::STANDARD;
        w.value.risk_reduction = dec!(0.30);
        let input = RosterInput { companies: vec![profile("Eps", dec!(5))], weights: Some(w) };
        assert!(matches!(
            score_roster(&input),
            Err(PriorityError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_duplicate_names_warned() {
        let input = RosterInput {
            companies: vec![profile("Same", dec!(5)), profile("Same", dec!(6))],
            weights: None,
        };
        let out = score_roster(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("Duplicate")));
        assert_eq!(out.result.portfolio.total_companies, 2);
    }

    #[test]
    fn test_overflowing_ebitda_is_error_not_panic() {
        let mut p = profile("Titan", dec!(10));
        p.scores.ebitda = dec!(30_000_000_000_000_000_000_000_000_000);
        let input = RosterInput { companies: vec![profile("Small", dec!(5)), p], weights: None };
        match score_roster(&input) {
            Err(PriorityError::Overflow { context }) => {
                assert_eq!(context, "portfolio_adjusted_priority for 'Titan'")
            }
            other => panic!("expected Overflow, got {other:?}"),
        }
    }
}
