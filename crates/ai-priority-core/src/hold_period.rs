//! Hold-Period allocation.
//!
//! Sequences AI investments against a fund's exit horizon using three tracks
//! whose value windows open one after another:
//!
//! | Track              | Window (months) | Allocation |
//! |--------------------|-----------------|------------|
//! | EBITDA Accelerator | 0-12            | 40-50 %    |
//! | Growth Enabler     | 12-24           | 30-40 %    |
//! | Exit Multiplier    | 24-36+          | 15-25 %    |

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PriorityError;
use crate::scoring::ScoredCompany;
use crate::types::*;
use crate::PriorityResult;

const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Track parameters
// ---------------------------------------------------------------------------

/// Recommended share of AI capital for one track, in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRange {
    pub min: Decimal,
    pub max: Decimal,
    pub recommended: Decimal,
}

impl AllocationRange {
    pub fn contains(&self, pct: Decimal) -> bool {
        pct >= self.min && pct <= self.max
    }
}

impl HoldPeriodTrack {
    /// Months after close at which the track's value starts to land.
    pub fn window_start_months(&self) -> u32 {
        match self {
            HoldPeriodTrack::EbitdaAccelerator => 0,
            HoldPeriodTrack::GrowthEnabler => 12,
            HoldPeriodTrack::ExitMultiplier => 24,
        }
    }

    /// Months after close by which the track's value is fully captured.
    pub fn window_end_months(&self) -> u32 {
        match self {
            HoldPeriodTrack::EbitdaAccelerator => 12,
            HoldPeriodTrack::GrowthEnabler => 24,
            HoldPeriodTrack::ExitMultiplier => 36,
        }
    }

    pub fn allocation_range(&self) -> AllocationRange {
        match self {
            HoldPeriodTrack::EbitdaAccelerator => AllocationRange {
                min: dec!(40),
                max: dec!(50),
                recommended: dec!(45),
            },
            HoldPeriodTrack::GrowthEnabler => AllocationRange {
                min: dec!(30),
                max: dec!(40),
                recommended: dec!(35),
            },
            HoldPeriodTrack::ExitMultiplier => AllocationRange {
                min: dec!(15),
                max: dec!(25),
                recommended: dec!(20),
            },
        }
    }

    pub fn focus(&self) -> &'static str {
        match self {
            HoldPeriodTrack::EbitdaAccelerator => "Immediate margin improvement and cost reduction",
            HoldPeriodTrack::GrowthEnabler => "Revenue growth and market expansion",
            HoldPeriodTrack::ExitMultiplier => "Strategic positioning and multiple expansion",
        }
    }
}

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Split of AI capital across the three tracks, in percent (45 = 45%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackAllocation {
    pub ebitda_accelerator: Decimal,
    pub growth_enabler: Decimal,
    pub exit_multiplier: Decimal,
}

impl TrackAllocation {
    pub const RECOMMENDED: TrackAllocation = TrackAllocation {
        ebitda_accelerator: dec!(45),
        growth_enabler: dec!(35),
        exit_multiplier: dec!(20),
    };

    pub fn get(&self, track: HoldPeriodTrack) -> Decimal {
        match track {
            HoldPeriodTrack::EbitdaAccelerator => self.ebitda_accelerator,
            HoldPeriodTrack::GrowthEnabler => self.growth_enabler,
            HoldPeriodTrack::ExitMultiplier => self.exit_multiplier,
        }
    }

    pub fn total(&self) -> Decimal {
        self.ebitda_accelerator + self.growth_enabler + self.exit_multiplier
    }
}

impl Default for TrackAllocation {
    fn default() -> Self {
        Self::RECOMMENDED
    }
}

/// Whether a track's value window fits before the planned exit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizonStatus {
    /// Window closes on or before exit
    Achievable,
    /// Window opens before exit but closes after it
    AtRisk,
    /// Window opens on or after exit
    NotAchievable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldPeriodInput {
    pub companies: Vec<ScoredCompany>,
    #[serde(default)]
    pub allocation: TrackAllocation,
    /// AI capital to split across the tracks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital_budget: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_date: Option<NaiveDate>,
    /// Valuation date for horizon and months-held figures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackCompany {
    pub company_name: String,
    pub adjusted_priority: Money,
    /// Whole months since investment; present when both dates are known
    pub months_held: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub track: HoldPeriodTrack,
    pub focus: String,
    pub window_start_months: u32,
    pub window_end_months: u32,
    pub allocation_pct: Decimal,
    pub recommended_range: AllocationRange,
    pub within_recommended_range: bool,
    pub capital_allocated: Option<Money>,
    pub company_count: usize,
    pub total_adjusted_priority: Money,
    /// Share of assigned adjusted priority, in percent (4 dp)
    pub value_share_pct: Decimal,
    /// Sorted by adjusted priority, highest first
    pub companies: Vec<TrackCompany>,
    pub horizon: Option<HorizonStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldPeriodOutput {
    /// Always all three tracks, in window order
    pub tracks: Vec<TrackSummary>,
    /// Companies without a track, by name
    pub unassigned: Vec<String>,
    /// Adjusted priority across assigned companies
    pub total_assigned_value: Money,
    pub months_to_exit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Check an allocation. Hard errors for negative shares or a total other
/// than 100; a share outside its recommended range comes back as a warning.
pub fn validate_allocation(allocation: &TrackAllocation) -> PriorityResult<Vec<String>> {
    let mut warnings = Vec::new();
    for track in HoldPeriodTrack::ALL {
        let pct = allocation.get(track);
        if pct < Decimal::ZERO {
            return Err(PriorityError::InvalidInput {
                field: format!("allocation.{}", field_name(track)),
                reason: "Allocation must be non-negative.".into(),
            });
        }
        let range = track.allocation_range();
        if !range.contains(pct) {
            warnings.push(format!(
                "{track} allocation {pct}% is outside the recommended {}-{}% range.",
                range.min, range.max
            ));
        }
    }
    let total = allocation.total();
    if total != HUNDRED {
        return Err(PriorityError::InvalidInput {
            field: "allocation".into(),
            reason: format!("Track allocations must sum to 100% (got {total}%)."),
        });
    }
    Ok(warnings)
}

/// Whole calendar months from `from` to `to`; negative when `to` is earlier.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let raw = (to.year() as i64 * 12 + to.month() as i64)
        - (from.year() as i64 * 12 + from.month() as i64);
    if raw > 0 && to.day() < from.day() {
        raw - 1
    } else if raw < 0 && to.day() > from.day() {
        raw + 1
    } else {
        raw
    }
}

pub fn horizon_status(track: HoldPeriodTrack, months_to_exit: i64) -> HorizonStatus {
    let start = track.window_start_months() as i64;
    let end = track.window_end_months() as i64;
    if end <= months_to_exit {
        HorizonStatus::Achievable
    } else if start < months_to_exit {
        HorizonStatus::AtRisk
    } else {
        HorizonStatus::NotAchievable
    }
}

/// Build the three-track hold-period plan for a scored roster.
pub fn plan_hold_period(
    input: &HoldPeriodInput,
) -> PriorityResult<ComputationOutput<HoldPeriodOutput>> {
    let start = Instant::now();
    let mut warnings = validate_allocation(&input.allocation)?;

    if let Some(budget) = input.capital_budget {
        if budget < Decimal::ZERO {
            return Err(PriorityError::InvalidInput {
                field: "capital_budget".into(),
                reason: "Capital budget must be non-negative.".into(),
            });
        }
    }

    let months_to_exit = match (input.exit_date, input.as_of) {
        (Some(exit), Some(as_of)) => {
            if exit < as_of {
                return Err(PriorityError::InvalidInput {
                    field: "exit_date".into(),
                    reason: "Exit date must not precede the as-of date.".into(),
                });
            }
            Some(months_between(as_of, exit))
        }
        (Some(_), None) => {
            return Err(PriorityError::InvalidInput {
                field: "as_of".into(),
                reason: "An as-of date is required to measure the exit horizon.".into(),
            });
        }
        (None, _) => None,
    };

    let mut unassigned: Vec<String> = Vec::new();
    let mut buckets: [Vec<TrackCompany>; 3] = Default::default();

    for company in &input.companies {
        let profile = &company.profile;
        let Some(track) = profile.track else {
            unassigned.push(profile.company_name.clone());
            continue;
        };
        let months_held = match (profile.investment_date, input.as_of) {
            (Some(invested), Some(as_of)) => Some(months_between(invested, as_of)),
            _ => None,
        };
        buckets[track_index(track)].push(TrackCompany {
            company_name: profile.company_name.clone(),
            adjusted_priority: company.scores.adjusted_priority,
            months_held,
        });
    }
    unassigned.sort();

    for name in &unassigned {
        tracing::warn!(company = %name, "No hold-period track assigned");
        warnings.push(format!(
            "{name} has no hold-period track and is excluded from track totals."
        ));
    }

    let total_assigned_value: Money = buckets
        .iter()
        .flatten()
        .map(|c| c.adjusted_priority)
        .sum();

    let mut tracks = Vec::with_capacity(3);
    for (track, mut companies) in HoldPeriodTrack::ALL.into_iter().zip(buckets) {
        companies.sort_by(|a, b| {
            b.adjusted_priority
                .cmp(&a.adjusted_priority)
                .then_with(|| a.company_name.cmp(&b.company_name))
        });
        let total: Money = companies.iter().map(|c| c.adjusted_priority).sum();
        let value_share_pct = total
            .checked_div(total_assigned_value)
            .map(|share| round_score(share * HUNDRED))
            .unwrap_or(Decimal::ZERO);
        let allocation_pct = input.allocation.get(track);
        let range = track.allocation_range();
        let horizon = months_to_exit.map(|m| horizon_status(track, m));

        if horizon == Some(HorizonStatus::NotAchievable) && !companies.is_empty() {
            tracing::warn!(%track, "Track value window opens after planned exit");
            warnings.push(format!(
                "{track} value window opens after the planned exit; {} companies affected.",
                companies.len()
            ));
        }

        tracks.push(TrackSummary {
            track,
            focus: track.focus().to_string(),
            window_start_months: track.window_start_months(),
            window_end_months: track.window_end_months(),
            allocation_pct,
            recommended_range: range,
            within_recommended_range: range.contains(allocation_pct),
            capital_allocated: input
                .capital_budget
                .map(|budget| round_money(budget * allocation_pct / HUNDRED)),
            company_count: companies.len(),
            total_adjusted_priority: total,
            value_share_pct,
            companies,
            horizon,
        });
    }

    tracing::debug!(
        assigned = input.companies.len() - unassigned.len(),
        unassigned = unassigned.len(),
        "Planned hold period"
    );

    let output = HoldPeriodOutput {
        tracks,
        unassigned,
        total_assigned_value,
        months_to_exit,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "allocation": input.allocation,
        "windows_months": {
            "ebitda_accelerator": "0-12",
            "growth_enabler": "12-24",
            "exit_multiplier": "24-36+",
        },
        "horizon": "achievable when the window closes by exit, at risk when it straddles exit",
    });

    Ok(with_metadata(
        "Hold-Period three-track value capture plan",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn track_index(track: HoldPeriodTrack) -> usize {
    match track {
        HoldPeriodTrack::EbitdaAccelerator => 0,
        HoldPeriodTrack::GrowthEnabler => 1,
        HoldPeriodTrack::ExitMultiplier => 2,
    }
}

fn field_name(track: HoldPeriodTrack) -> &'static str {
    match track {
        HoldPeriodTrack::EbitdaAccelerator => "ebitda_accelerator",
        HoldPeriodTrack::GrowthEnabler => "growth_enabler",
        HoldPeriodTrack::ExitMultiplier => "exit_multiplier",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::AssessmentFinancials;
    use crate::scoring::{CompanyInputScores, CompanyProfile, CompanyRecordAssembler};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scored(name: &str, track: Option<HoldPeriodTrack>, score: Decimal) -> ScoredCompany {
        let inputs = CompanyInputScores {
            ebitda_impact: score,
            revenue_enablement: score,
            risk_reduction: score,
            organizational_capacity: score,
            data_availability: score,
            tech_infrastructure: score,
            timeline_fit: score,
            ebitda: dec!(20_000_000),
            replication_potential: None,
        };
        ScoredCompany {
            replication_potential: dec!(5),
            scores: CompanyRecordAssembler::default().assemble(&inputs).unwrap(),
            profile: CompanyProfile {
                company_name: name.into(),
                investment_category: None,
                theme: None,
                track,
                platform_classification: None,
                investment_date: Some(date(2023, 3, 15)),
                scores: inputs,
                assessment: AssessmentFinancials::default(),
            },
        }
    }

    fn input(companies: Vec<ScoredCompany>) -> HoldPeriodInput {
        HoldPeriodInput {
            companies,
            allocation: TrackAllocation::default(),
            capital_budget: None,
            exit_date: None,
            as_of: None,
        }
    }

    #[test]
    fn test_recommended_allocation_is_valid() {
        assert_eq!(TrackAllocation::RECOMMENDED.total(), dec!(100));
        assert!(validate_allocation(&TrackAllocation::RECOMMENDED).unwrap().is_empty());
        for track in HoldPeriodTrack::ALL {
            let range = track.allocation_range();
            assert!(range.contains(range.recommended));
        }
    }

    #[test]
    fn test_allocation_outside_range_warns() {
        let alloc = TrackAllocation {
            ebitda_accelerator: dec!(60),
            growth_enabler: dec!(30),
            exit_multiplier: dec!(10),
        };
        let warnings = validate_allocation(&alloc).unwrap();
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_allocation_must_sum_to_hundred() {
        let alloc = TrackAllocation {
            ebitda_accelerator: dec!(45),
            growth_enabler: dec!(35),
            exit_multiplier: dec!(25),
        };
        assert!(validate_allocation(&alloc).is_err());
        let negative = TrackAllocation {
            ebitda_accelerator: dec!(110),
            growth_enabler: dec!(-10),
            exit_multiplier: dec!(0),
        };
        assert!(validate_allocation(&negative).is_err());
    }

    #[test]
    fn test_months_between() {
        assert_eq!(months_between(date(2024, 1, 15), date(2025, 1, 15)), 12);
        assert_eq!(months_between(date(2024, 1, 15), date(2025, 1, 14)), 11);
        assert_eq!(months_between(date(2024, 1, 31), date(2024, 3, 1)), 1);
        assert_eq!(months_between(date(2025, 1, 15), date(2024, 1, 15)), -12);
        assert_eq!(months_between(date(2024, 6, 1), date(2024, 6, 30)), 0);
    }

    #[test]
    fn test_horizon_status() {
        use HoldPeriodTrack::*;
        use HorizonStatus::*;
        assert_eq!(horizon_status(EbitdaAccelerator, 18), Achievable);
        assert_eq!(horizon_status(GrowthEnabler, 18), AtRisk);
        assert_eq!(horizon_status(ExitMultiplier, 18), NotAchievable);
        assert_eq!(horizon_status(ExitMultiplier, 36), Achievable);
        assert_eq!(horizon_status(GrowthEnabler, 12), NotAchievable);
    }

    #[test]
    fn test_plan_groups_and_sorts_by_track() {
        let companies = vec![
            scored("Port A", Some(HoldPeriodTrack::EbitdaAccelerator), dec!(5)),
            scored("Port B", Some(HoldPeriodTrack::EbitdaAccelerator), dec!(8)),
            scored("Rail C", Some(HoldPeriodTrack::ExitMultiplier), dec!(6)),
            scored("Loose D", None, dec!(9)),
        ];
        let out = plan_hold_period(&input(companies)).unwrap();
        let plan = out.result;

        assert_eq!(plan.tracks.len(), 3);
        let ea = &plan.tracks[0];
        assert_eq!(ea.track, HoldPeriodTrack::EbitdaAccelerator);
        assert_eq!(ea.company_count, 2);
        assert_eq!(ea.companies[0].company_name, "Port B");
        assert_eq!(plan.tracks[1].company_count, 0);
        assert_eq!(plan.tracks[1].value_share_pct, Decimal::ZERO);
        assert_eq!(plan.unassigned, vec!["Loose D".to_string()]);
        assert_eq!(out.warnings.len(), 1);

        let share_total: Decimal = plan.tracks.iter().map(|t| t.value_share_pct).sum();
        assert!((share_total - dec!(100)).abs() <= dec!(0.0002));
        assert_eq!(
            plan.total_assigned_value,
            plan.tracks.iter().map(|t| t.total_adjusted_priority).sum::<Decimal>()
        );
    }

    #[test]
    fn test_capital_budget_split() {
        let mut inp = input(vec![scored("A", Some(HoldPeriodTrack::GrowthEnabler), dec!(7))]);
        inp.capital_budget = Some(dec!(10_000_000));
        let plan = plan_hold_period(&inp).unwrap().result;
        assert_eq!(plan.tracks[0].capital_allocated, Some(dec!(4_500_000)));
        assert_eq!(plan.tracks[1].capital_allocated, Some(dec!(3_500_000)));
        assert_eq!(plan.tracks[2].capital_allocated, Some(dec!(2_000_000)));
    }

    #[test]
    fn test_exit_horizon_and_months_held() {
        let mut inp = input(vec![
            scored("A", Some(HoldPeriodTrack::EbitdaAccelerator), dec!(7)),
            scored("B", Some(HoldPeriodTrack::ExitMultiplier), dec!(7)),
        ]);
        inp.as_of = Some(date(2025, 3, 15));
        inp.exit_date = Some(date(2026, 9, 15));
        let out = plan_hold_period(&inp).unwrap();
        let plan = out.result;
        assert_eq!(plan.months_to_exit, Some(18));
        assert_eq!(plan.tracks[0].horizon, Some(HorizonStatus::Achievable));
        assert_eq!(plan.tracks[1].horizon, Some(HorizonStatus::AtRisk));
        assert_eq!(plan.tracks[2].horizon, Some(HorizonStatus::NotAchievable));
        assert_eq!(plan.tracks[0].companies[0].months_held, Some(24));
        assert!(out.warnings.iter().any(|w| w.contains("Exit Multiplier")));
    }

    #[test]
    fn test_invalid_dates_and_budget_rejected() {
        let mut inp = input(vec![]);
        inp.exit_date = Some(date(2026, 1, 1));
        assert!(plan_hold_period(&inp).is_err());

        inp.as_of = Some(date(2027, 1, 1));
        assert!(plan_hold_period(&inp).is_err());

        let mut inp = input(vec![]);
        inp.capital_budget = Some(dec!(-5));
        assert!(plan_hold_period(&inp).is_err());
    }
}
