use ai_priority_core::portfolio::{aggregate_portfolio, AssessmentFinancials, PortfolioRecord};
use ai_priority_core::scoring::{
    score_roster, CompanyInputScores, CompanyProfile, Quadrant, RosterInput,
};
use ai_priority_core::{HoldPeriodTrack, ValueTheme};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn company(
    name: &str,
    drivers: [Decimal; 7],
    ebitda: Decimal,
    replication: Option<Decimal>,
) -> CompanyProfile {
    CompanyProfile {
        company_name: name.into(),
        investment_category: Some("Digital Infrastructure".into()),
        theme: Some(ValueTheme::MarginExpansion),
        track: Some(HoldPeriodTrack::EbitdaAccelerator),
        platform_classification: None,
        investment_date: None,
        scores: CompanyInputScores {
            ebitda_impact: drivers[0],
            revenue_enablement: drivers[1],
            risk_reduction: drivers[2],
            organizational_capacity: drivers[3],
            data_availability: drivers[4],
            tech_infrastructure: drivers[5],
            timeline_fit: drivers[6],
            ebitda,
            replication_potential: replication,
        },
        assessment: AssessmentFinancials::default(),
    }
}

fn roster() -> Vec<CompanyProfile> {
    vec![
        company(
            "Atlas Fiber",
            [dec!(8), dec!(7), dec!(6), dec!(7), dec!(8), dec!(7), dec!(8)],
            dec!(100_000_000),
            Some(dec!(8)),
        ),
        company(
            "Beacon Towers",
            [dec!(6), dec!(5.5), dec!(7), dec!(8), dec!(8.5), dec!(7), dec!(9)],
            dec!(42_500_000),
            None,
        ),
        company(
            "Cobalt Grid",
            [dec!(9), dec!(8), dec!(7.5), dec!(4), dec!(5), dec!(6), dec!(3)],
            dec!(18_333_333.33),
            Some(dec!(2)),
        ),
        company(
            "Delta Ports",
            [dec!(3), dec!(4), dec!(2), dec!(5), dec!(4), dec!(3), dec!(6)],
            dec!(7_777_777.77),
            Some(dec!(0)),
        ),
        company(
            "Echo Care",
            [dec!(7.3), dec!(6.1), dec!(8.9), dec!(6.6), dec!(7.7), dec!(5.4), dec!(6.2)],
            dec!(63_123_456.78),
            Some(dec!(9.5)),
        ),
    ]
}

fn metrics_for(companies: Vec<CompanyProfile>) -> ai_priority_core::portfolio::PortfolioMetrics {
    score_roster(&RosterInput { companies, weights: None })
        .unwrap()
        .result
        .portfolio
}

// ===========================================================================
// Aggregation invariants
// ===========================================================================

#[test]
fn test_permutation_invariance() {
    let baseline = metrics_for(roster());

    let mut reversed = roster();
    reversed.reverse();
    assert_eq!(metrics_for(reversed), baseline);

    let mut rotated = roster();
    rotated.rotate_left(2);
    assert_eq!(metrics_for(rotated), baseline);

    let mut swapped = roster();
    swapped.swap(0, 3);
    swapped.swap(1, 4);
    assert_eq!(metrics_for(swapped), baseline);
}

#[test]
fn test_quadrant_counts_sum_to_total() {
    let m = metrics_for(roster());
    assert_eq!(m.total_companies, 5);
    assert_eq!(m.quadrant_counts.total(), m.total_companies);
    let per_quadrant: usize = Quadrant::ALL.iter().map(|q| m.quadrant_counts.get(*q)).sum();
    assert_eq!(per_quadrant, 5);
}

#[test]
fn test_sums_match_scored_companies() {
    let out = score_roster(&RosterInput { companies: roster(), weights: None }).unwrap().result;
    let total_ap: Decimal = out.companies.iter().map(|c| c.scores.adjusted_priority).sum();
    let total_pap: Decimal = out
        .companies
        .iter()
        .map(|c| c.scores.portfolio_adjusted_priority)
        .sum();
    let champions: Decimal = out
        .companies
        .iter()
        .filter(|c| c.scores.quadrant == Quadrant::Champions)
        .map(|c| c.scores.adjusted_priority)
        .sum();
    assert_eq!(out.portfolio.total_adjusted_priority, total_ap);
    assert_eq!(out.portfolio.total_portfolio_adjusted_priority, total_pap);
    assert_eq!(out.portfolio.champions_value, champions);
    assert_eq!(out.portfolio.by_theme.get(&ValueTheme::MarginExpansion), Some(&5));
}

#[test]
fn test_empty_roster_yields_zero_averages() {
    let out = score_roster(&RosterInput { companies: vec![], weights: None }).unwrap();
    let m = out.result.portfolio;
    assert_eq!(m.total_companies, 0);
    assert_eq!(m.avg_value_per_company, Decimal::ZERO);
    assert_eq!(m.avg_priority_score, Decimal::ZERO);
    assert_eq!(m.total_adjusted_priority, Decimal::ZERO);
    assert!(!out.warnings.is_empty());
}

#[test]
fn test_malformed_records_do_not_abort_batch() {
    let scored = score_roster(&RosterInput { companies: roster(), weights: None }).unwrap().result;
    let mut records: Vec<PortfolioRecord> =
        scored.companies.iter().map(PortfolioRecord::from).collect();
    records[2].scores = None;
    records[4].ebitda = None;

    let out = aggregate_portfolio(&records);
    assert_eq!(out.result.total_companies, 3);
    assert_eq!(out.result.skipped_records, 2);
    assert_eq!(out.result.quadrant_counts.total(), 3);
    assert_eq!(out.warnings.len(), 2);
}

#[test]
fn test_averages_rounded_to_four_places() {
    let m = metrics_for(roster());
    assert!(m.avg_value_score.scale() <= 4);
    assert!(m.avg_readiness_score.scale() <= 4);
    assert!(m.total_adjusted_ebitda.scale() <= 2);
}

// ===========================================================================
// Rayon path
// ===========================================================================

#[cfg(feature = "parallel")]
mod parallel {
    use super::*;
    use ai_priority_core::portfolio::{fold_records, PortfolioTotals};
    use ai_priority_core::scoring::CompanyRecordAssembler;

    fn large_roster(n: u32) -> Vec<CompanyProfile> {
        (0..n)
            .map(|i| {
                let d = |k: u32| Decimal::from(1 + (i * 7 + k * 3) % 10);
                company(
                    &format!("Company {i:04}"),
                    [d(0), d(1), d(2), d(3), d(4), d(5), d(6)],
                    Decimal::from(1_000_000 + i * 12_345),
                    Some(Decimal::from(i % 11)),
                )
            })
            .collect()
    }

    #[test]
    fn test_parallel_scoring_preserves_input_order() {
        let companies = large_roster(500);
        let out = score_roster(&RosterInput { companies: companies.clone(), weights: None })
            .unwrap()
            .result;

        assert_eq!(out.companies.len(), 500);
        let assembler = CompanyRecordAssembler::default();
        for (scored, profile) in out.companies.iter().zip(&companies) {
            assert_eq!(scored.profile.company_name, profile.company_name);
            assert_eq!(scored.scores, assembler.assemble(&profile.scores).unwrap());
        }
    }

    #[test]
    fn test_parallel_fold_matches_sequential_fold() {
        let scored = score_roster(&RosterInput { companies: large_roster(500), weights: None })
            .unwrap()
            .result;
        let mut records: Vec<PortfolioRecord> =
            scored.companies.iter().map(PortfolioRecord::from).collect();
        records[17].scores = None;
        records[250].ebitda = None;

        let sequential = records
            .iter()
            .fold(PortfolioTotals::default(), PortfolioTotals::absorb);
        let parallel = fold_records(&records);
        assert_eq!(parallel.skipped(), sequential.skipped());
        assert_eq!(parallel.finish(), sequential.finish());
        assert_eq!(scored.portfolio.total_companies, 500);
    }
}
