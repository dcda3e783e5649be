use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::scoring::{CalculatedCompanyScores, Quadrant};
use crate::types::*;

/// Largest magnitude any single amount may carry into the sums. Keeps exact
/// Decimal totals of several million records inside the 96-bit range.
pub const RECORD_MAGNITUDE_LIMIT: Decimal = dec!(10_000_000_000_000_000_000_000);

const MISSING_FIELDS: &str = "is missing EBITDA or calculated scores";
const BEYOND_LIMIT: &str = "carries an amount beyond 1e22";

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// One company as seen by the aggregator: its scored bundle plus opaque
/// pass-through fields. `ebitda` and `scores` are required; a record missing
/// either, or carrying any amount above [`RECORD_MAGNITUDE_LIMIT`], is
/// excluded from every sum and counted as skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioRecord {
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<ValueTheme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<HoldPeriodTrack>,
    #[serde(default)]
    pub ebitda: Option<Money>,
    #[serde(default)]
    pub scores: Option<CalculatedCompanyScores>,
    #[serde(default)]
    pub assessment: AssessmentFinancials,
}

/// Per-company AI assessment totals carried through to portfolio sums.
/// Missing fields contribute zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentFinancials {
    #[serde(default)]
    pub annual_value: Option<Money>,
    #[serde(default)]
    pub cost_benefit: Option<Money>,
    #[serde(default)]
    pub revenue_benefit: Option<Money>,
    #[serde(default)]
    pub risk_benefit: Option<Money>,
    #[serde(default)]
    pub cash_flow_benefit: Option<Money>,
    #[serde(default)]
    pub monthly_tokens: Option<Decimal>,
    #[serde(default)]
    pub annual_token_cost: Option<Money>,
    #[serde(default)]
    pub friction_cost: Option<Money>,
    #[serde(default)]
    pub use_cases: Vec<UseCaseSummary>,
}

/// Roadmap entry of one AI use case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseCaseSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<PriorityTier>,
    /// 0-100 roadmap priority; entries without a score are left out of the average
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_score: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadrantCounts {
    pub champions: usize,
    pub quick_wins: usize,
    pub strategic: usize,
    pub foundations: usize,
}

impl QuadrantCounts {
    pub fn total(&self) -> usize {
        self.champions + self.quick_wins + self.strategic + self.foundations
    }

    pub fn get(&self, quadrant: Quadrant) -> usize {
        match quadrant {
            Quadrant::Champions => self.champions,
            Quadrant::QuickWins => self.quick_wins,
            Quadrant::Strategic => self.strategic,
            Quadrant::Foundations => self.foundations,
        }
    }

    fn increment(&mut self, quadrant: Quadrant) {
        match quadrant {
            Quadrant::Champions => self.champions += 1,
            Quadrant::QuickWins => self.quick_wins += 1,
            Quadrant::Strategic => self.strategic += 1,
            Quadrant::Foundations => self.foundations += 1,
        }
    }

    fn merge(&mut self, other: &QuadrantCounts) {
        self.champions += other.champions;
        self.quick_wins += other.quick_wins;
        self.strategic += other.strategic;
        self.foundations += other.foundations;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TierCounts {
    fn increment(&mut self, tier: PriorityTier) {
        match tier {
            PriorityTier::Critical => self.critical += 1,
            PriorityTier::High => self.high += 1,
            PriorityTier::Medium => self.medium += 1,
            PriorityTier::Low => self.low += 1,
        }
    }

    fn merge(&mut self, other: &TierCounts) {
        self.critical += other.critical;
        self.high += other.high;
        self.medium += other.medium;
        self.low += other.low;
    }
}

/// Portfolio-wide statistics over one evaluated set of companies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Records that contributed to the aggregate
    pub total_companies: usize,
    /// Records excluded for missing required fields
    pub skipped_records: usize,
    // Value-readiness financials
    pub total_ebitda: Money,
    pub total_adjusted_ebitda: Money,
    pub total_adjusted_priority: Money,
    pub total_portfolio_adjusted_priority: Money,
    pub avg_value_score: Score,
    pub avg_readiness_score: Score,
    pub avg_priority_score: Score,
    pub quadrant_counts: QuadrantCounts,
    /// Sum of adjusted priority over Champions
    pub champions_value: Money,
    pub by_category: BTreeMap<String, usize>,
    pub by_theme: BTreeMap<ValueTheme, usize>,
    pub by_track: BTreeMap<HoldPeriodTrack, usize>,
    // AI assessment roll-up
    pub total_annual_value: Money,
    pub total_cost_benefit: Money,
    pub total_revenue_benefit: Money,
    pub total_risk_benefit: Money,
    pub total_cash_flow_benefit: Money,
    pub total_monthly_tokens: Decimal,
    pub total_annual_token_cost: Money,
    pub total_friction_cost: Money,
    pub total_use_cases: usize,
    pub avg_value_per_company: Money,
    pub avg_use_cases_per_company: Decimal,
    pub tier_counts: TierCounts,
    pub avg_use_case_priority_score: Decimal,
}

// ---------------------------------------------------------------------------
// Accumulator
// ---------------------------------------------------------------------------

/// Commutative partial sums. Decimal addition is exact, so any split of the
/// records into partials merged in any order yields the same totals.
#[derive(Debug, Clone, Default)]
pub struct PortfolioTotals {
    companies: usize,
    skipped: Vec<(String, &'static str)>,
    ebitda: Money,
    adjusted_ebitda: Money,
    adjusted_priority: Money,
    portfolio_adjusted_priority: Money,
    value_score: Decimal,
    readiness_score: Decimal,
    priority_score: Decimal,
    quadrants: QuadrantCounts,
    champions_value: Money,
    by_category: BTreeMap<String, usize>,
    by_theme: BTreeMap<ValueTheme, usize>,
    by_track: BTreeMap<HoldPeriodTrack, usize>,
    annual_value: Money,
    cost_benefit: Money,
    revenue_benefit: Money,
    risk_benefit: Money,
    cash_flow_benefit: Money,
    monthly_tokens: Decimal,
    annual_token_cost: Money,
    friction_cost: Money,
    use_cases: usize,
    tiers: TierCounts,
    use_case_priority_total: Decimal,
    use_case_priority_count: usize,
}

impl PortfolioTotals {
    pub fn absorb(mut self, record: &PortfolioRecord) -> Self {
        let (ebitda, scores) = match (record.ebitda, record.scores.as_ref()) {
            (Some(e), Some(s)) => (e, s),
            _ => {
                self.skipped.push((record.company_name.clone(), MISSING_FIELDS));
                return self;
            }
        };
        if beyond_limit(ebitda, scores, &record.assessment) {
            self.skipped.push((record.company_name.clone(), BEYOND_LIMIT));
            return self;
        }

        self.companies += 1;
        self.ebitda += ebitda;
        self.adjusted_ebitda += scores.adjusted_ebitda;
        self.adjusted_priority += scores.adjusted_priority;
        self.portfolio_adjusted_priority += scores.portfolio_adjusted_priority;
        self.value_score += scores.value_score;
        self.readiness_score += scores.readiness_score;
        self.priority_score += scores.priority_score;
        self.quadrants.increment(scores.quadrant);
        if scores.quadrant == Quadrant::Champions {
            self.champions_value += scores.adjusted_priority;
        }

        if let Some(ref category) = record.investment_category {
            *self.by_category.entry(category.clone()).or_insert(0) += 1;
        }
        if let Some(theme) = record.theme {
            *self.by_theme.entry(theme).or_insert(0) += 1;
        }
        if let Some(track) = record.track {
            *self.by_track.entry(track).or_insert(0) += 1;
        }

        let a = &record.assessment;
        self.annual_value += a.annual_value.unwrap_or_default();
        self.cost_benefit += a.cost_benefit.unwrap_or_default();
        self.revenue_benefit += a.revenue_benefit.unwrap_or_default();
        self.risk_benefit += a.risk_benefit.unwrap_or_default();
        self.cash_flow_benefit += a.cash_flow_benefit.unwrap_or_default();
        self.monthly_tokens += a.monthly_tokens.unwrap_or_default();
        self.annual_token_cost += a.annual_token_cost.unwrap_or_default();
        self.friction_cost += a.friction_cost.unwrap_or_default();
        self.use_cases += a.use_cases.len();
        for uc in &a.use_cases {
            if let Some(tier) = uc.tier {
                self.tiers.increment(tier);
            }
            if let Some(score) = uc.priority_score {
                self.use_case_priority_total += score;
                self.use_case_priority_count += 1;
            }
        }
        self
    }

    pub fn merge(mut self, other: PortfolioTotals) -> Self {
        self.companies += other.companies;
        self.skipped.extend(other.skipped);
        self.ebitda += other.ebitda;
        self.adjusted_ebitda += other.adjusted_ebitda;
        self.adjusted_priority += other.adjusted_priority;
        self.portfolio_adjusted_priority += other.portfolio_adjusted_priority;
        self.value_score += other.value_score;
        self.readiness_score += other.readiness_score;
        self.priority_score += other.priority_score;
        self.quadrants.merge(&other.quadrants);
        self.champions_value += other.champions_value;
        for (k, v) in other.by_category {
            *self.by_category.entry(k).or_insert(0) += v;
        }
        for (k, v) in other.by_theme {
            *self.by_theme.entry(k).or_insert(0) += v;
        }
        for (k, v) in other.by_track {
            *self.by_track.entry(k).or_insert(0) += v;
        }
        self.annual_value += other.annual_value;
        self.cost_benefit += other.cost_benefit;
        self.revenue_benefit += other.revenue_benefit;
        self.risk_benefit += other.risk_benefit;
        self.cash_flow_benefit += other.cash_flow_benefit;
        self.monthly_tokens += other.monthly_tokens;
        self.annual_token_cost += other.annual_token_cost;
        self.friction_cost += other.friction_cost;
        self.use_cases += other.use_cases;
        self.tiers.merge(&other.tiers);
        self.use_case_priority_total += other.use_case_priority_total;
        self.use_case_priority_count += other.use_case_priority_count;
        self
    }

    /// Records excluded from the sums with the reason, sorted by name.
    pub fn skipped(&self) -> Vec<(String, &'static str)> {
        let mut skipped = self.skipped.clone();
        skipped.sort();
        skipped
    }

    pub fn finish(self) -> PortfolioMetrics {
        let n = self.companies;
        PortfolioMetrics {
            total_companies: n,
            skipped_records: self.skipped.len(),
            total_ebitda: self.ebitda,
            total_adjusted_ebitda: self.adjusted_ebitda,
            total_adjusted_priority: self.adjusted_priority,
            total_portfolio_adjusted_priority: self.portfolio_adjusted_priority,
            avg_value_score: round_score(average_or_zero(self.value_score, n)),
            avg_readiness_score: round_score(average_or_zero(self.readiness_score, n)),
            avg_priority_score: round_score(average_or_zero(self.priority_score, n)),
            quadrant_counts: self.quadrants,
            champions_value: self.champions_value,
            by_category: self.by_category,
            by_theme: self.by_theme,
            by_track: self.by_track,
            total_annual_value: self.annual_value,
            total_cost_benefit: self.cost_benefit,
            total_revenue_benefit: self.revenue_benefit,
            total_risk_benefit: self.risk_benefit,
            total_cash_flow_benefit: self.cash_flow_benefit,
            total_monthly_tokens: self.monthly_tokens,
            total_annual_token_cost: self.annual_token_cost,
            total_friction_cost: self.friction_cost,
            total_use_cases: self.use_cases,
            avg_value_per_company: round_money(average_or_zero(self.annual_value, n)),
            avg_use_cases_per_company: round_score(average_or_zero(
                Decimal::from(self.use_cases as u64),
                n,
            )),
            tier_counts: self.tiers,
            avg_use_case_priority_score: round_score(average_or_zero(
                self.use_case_priority_total,
                self.use_case_priority_count,
            )),
        }
    }
}

fn beyond_limit(
    ebitda: Money,
    scores: &CalculatedCompanyScores,
    a: &AssessmentFinancials,
) -> bool {
    let amounts = [
        Some(ebitda),
        Some(scores.value_score),
        Some(scores.readiness_score),
        Some(scores.priority_score),
        Some(scores.adjusted_ebitda),
        Some(scores.adjusted_priority),
        Some(scores.portfolio_adjusted_priority),
        a.annual_value,
        a.cost_benefit,
        a.revenue_benefit,
        a.risk_benefit,
        a.cash_flow_benefit,
        a.monthly_tokens,
        a.annual_token_cost,
        a.friction_cost,
    ];
    amounts
        .into_iter()
        .flatten()
        .chain(a.use_cases.iter().filter_map(|uc| uc.priority_score))
        .any(|v| v.abs() > RECORD_MAGNITUDE_LIMIT)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Fold records into partial totals.
#[cfg(not(feature = "parallel"))]
pub fn fold_records(records: &[PortfolioRecord]) -> PortfolioTotals {
    records
        .iter()
        .fold(PortfolioTotals::default(), PortfolioTotals::absorb)
}

/// Fold records into partial totals across the rayon pool.
#[cfg(feature = "parallel")]
pub fn fold_records(records: &[PortfolioRecord]) -> PortfolioTotals {
    use rayon::prelude::*;

    records
        .par_iter()
        .fold(PortfolioTotals::default, PortfolioTotals::absorb)
        .reduce(PortfolioTotals::default, PortfolioTotals::merge)
}

/// Aggregate already-scored companies into portfolio metrics.
///
/// Never fails: malformed records are excluded and reported as warnings, and
/// an empty roster produces zero totals and zero averages.
pub fn aggregate_portfolio(records: &[PortfolioRecord]) -> ComputationOutput<PortfolioMetrics> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    tracing::debug!("Aggregating {} portfolio records", records.len());
    let totals = fold_records(records);

    for (name, reason) in totals.skipped() {
        tracing::warn!(company = %name, reason, "Record excluded from portfolio totals");
        warnings.push(format!("Record '{name}' {reason} and was excluded from totals."));
    }
    if records.is_empty() {
        warnings.push("Empty portfolio; all totals and averages are zero.".into());
    }

    let metrics = totals.finish();

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "reduction": "exact decimal sums, order independent",
        "averages": "total / included companies; 0 when no company is included",
        "required_fields": ["ebitda", "scores"],
        "record_magnitude_limit": RECORD_MAGNITUDE_LIMIT.to_string(),
        "records_received": records.len(),
    });

    with_metadata(
        "Portfolio aggregation (value-readiness and AI assessment roll-up)",
        &assumptions,
        warnings,
        elapsed,
        metrics,
    )
}
