//! Portfolio Amplification.
//!
//! Rewards AI solutions that can be redeployed across several portfolio
//! companies. Replication potential (1-10) drives two things:
//!
//! - **Classification**: Platform Play at or above the platform threshold,
//!   Point Solution below it.
//! - **Uplift**: the gap between portfolio-adjusted and adjusted priority,
//!   i.e. the value of the replication bonus for each company.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::scoring::ScoredCompany;
use crate::types::*;
use crate::weights::WeightConfig;
use crate::PriorityResult;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Sort key for the amplification league table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmplificationRanking {
    #[default]
    PortfolioAdjustedPriority,
    ReplicationPotential,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmplificationInput {
    pub companies: Vec<ScoredCompany>,
    #[serde(default)]
    pub ranking: AmplificationRanking,
    /// Table the companies were scored with; its `platform_threshold`
    /// splits platform plays from point solutions. Standard table when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<WeightConfig>,
    /// Restrict the league table to one classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<PlatformClassification>,
}

/// One row of the amplification league table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmplifiedCompany {
    pub rank: usize,
    pub company_name: String,
    pub investment_category: Option<String>,
    pub replication_potential: Score,
    pub classification: PlatformClassification,
    /// `true` when the classification came from the profile, not the threshold
    pub classification_overridden: bool,
    pub adjusted_priority: Money,
    pub portfolio_adjusted_priority: Money,
    /// portfolio_adjusted_priority - adjusted_priority
    pub replication_uplift: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryReplication {
    pub investment_category: String,
    pub company_count: usize,
    /// 4 dp
    pub avg_replication_potential: Score,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmplificationOutput {
    pub ranked: Vec<AmplifiedCompany>,
    pub platform_play_count: usize,
    pub point_solution_count: usize,
    pub platform_play_value: Money,
    pub point_solution_value: Money,
    pub total_replication_uplift: Money,
    pub avg_replication_potential: Score,
    /// Sorted by average replication potential, highest first
    pub by_category: Vec<CategoryReplication>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Platform Play iff `replication_potential >= threshold`.
pub fn classify_platform(
    replication_potential: Score,
    threshold: Score,
) -> PlatformClassification {
    if replication_potential >= threshold {
        PlatformClassification::PlatformPlay
    } else {
        PlatformClassification::PointSolution
    }
}

/// Rank companies by amplification value and summarize platform economics.
///
/// Counts, values and category averages cover the whole roster; only the
/// league table honours `filter`.
pub fn analyze_amplification(
    input: &AmplificationInput,
) -> PriorityResult<ComputationOutput<AmplificationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let weights = input.weights.unwrap_or(WeightConfig::STANDARD);
    weights.validate()?;
    let threshold = weights.platform_threshold;

    let mut rows: Vec<AmplifiedCompany> = input
        .companies
        .iter()
        .map(|c| amplified_row(c, threshold))
        .collect();

    for row in rows.iter().filter(|r| r.classification_overridden) {
        let derived = classify_platform(row.replication_potential, threshold);
        if derived != row.classification {
            tracing::warn!(
                company = %row.company_name,
                explicit = %row.classification,
                %derived,
                "Explicit platform classification disagrees with replication potential"
            );
            warnings.push(format!(
                "{}: classified as {} but replication potential {} implies {}.",
                row.company_name, row.classification, row.replication_potential, derived
            ));
        }
    }

    let mut platform_play_count = 0usize;
    let mut platform_play_value = Decimal::ZERO;
    let mut point_solution_value = Decimal::ZERO;
    let mut total_uplift = Decimal::ZERO;
    let mut replication_total = Decimal::ZERO;
    let mut categories: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();

    for row in &rows {
        match row.classification {
            PlatformClassification::PlatformPlay => {
                platform_play_count += 1;
                platform_play_value += row.portfolio_adjusted_priority;
            }
            PlatformClassification::PointSolution => {
                point_solution_value += row.portfolio_adjusted_priority;
            }
        }
        total_uplift += row.replication_uplift;
        replication_total += row.replication_potential;

        let category = row
            .investment_category
            .clone()
            .unwrap_or_else(|| "Uncategorized".to_string());
        let entry = categories.entry(category).or_insert((Decimal::ZERO, 0));
        entry.0 += row.replication_potential;
        entry.1 += 1;
    }

    let mut by_category: Vec<CategoryReplication> = categories
        .into_iter()
        .map(|(name, (total, count))| CategoryReplication {
            investment_category: name,
            company_count: count,
            avg_replication_potential: round_score(average_or_zero(total, count)),
        })
        .collect();
    // stable sort keeps BTreeMap name order on ties
    by_category.sort_by(|a, b| b.avg_replication_potential.cmp(&a.avg_replication_potential));

    let company_count = rows.len();

    if let Some(filter) = input.filter {
        rows.retain(|r| r.classification == filter);
    }
    rows.sort_by(|a, b| compare_rows(a, b, input.ranking));
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }

    if company_count == 0 {
        warnings.push("No companies supplied; amplification summary is empty.".into());
    }

    let output = AmplificationOutput {
        ranked: rows,
        platform_play_count,
        point_solution_count: company_count - platform_play_count,
        platform_play_value,
        point_solution_value,
        total_replication_uplift: total_uplift,
        avg_replication_potential: round_score(average_or_zero(replication_total, company_count)),
        by_category,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "platform_threshold": threshold.to_string(),
        "weights_version": weights.version,
        "ranking": input.ranking,
        "uplift": "portfolio_adjusted_priority - adjusted_priority",
    });

    Ok(with_metadata(
        "Portfolio Amplification (replication potential and platform classification)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn amplified_row(company: &ScoredCompany, threshold: Score) -> AmplifiedCompany {
    let profile = &company.profile;
    let (classification, overridden) = match profile.platform_classification {
        Some(explicit) => (explicit, true),
        None => (classify_platform(company.replication_potential, threshold), false),
    };
    AmplifiedCompany {
        rank: 0,
        company_name: profile.company_name.clone(),
        investment_category: profile.investment_category.clone(),
        replication_potential: company.replication_potential,
        classification,
        classification_overridden: overridden,
        adjusted_priority: company.scores.adjusted_priority,
        portfolio_adjusted_priority: company.scores.portfolio_adjusted_priority,
        replication_uplift: company.scores.portfolio_adjusted_priority
            - company.scores.adjusted_priority,
    }
}

/// Descending on the ranking key, then ascending by name.
fn compare_rows(
    a: &AmplifiedCompany,
    b: &AmplifiedCompany,
    ranking: AmplificationRanking,
) -> Ordering {
    let primary = match ranking {
        AmplificationRanking::PortfolioAdjustedPriority => {
            b.portfolio_adjusted_priority.cmp(&a.portfolio_adjusted_priority)
        }
        AmplificationRanking::ReplicationPotential => {
            b.replication_potential.cmp(&a.replication_potential)
        }
    };
    primary.then_with(|| a.company_name.cmp(&b.company_name))
}
