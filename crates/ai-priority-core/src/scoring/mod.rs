//! Value-Readiness scoring: per-company formulas, quadrant placement and the
//! record pipeline that ties them together.

pub mod assembler;
pub mod calculator;
pub mod quadrant;
pub mod roster;

pub use assembler::{
    validate_company_inputs, validate_score, CalculatedCompanyScores, CompanyInputScores,
    CompanyRecordAssembler, SCORE_RANGE_MAX, SCORE_RANGE_MIN,
};
pub use calculator::ScoreCalculator;
pub use quadrant::{determine_quadrant, Quadrant, QuadrantClassifier};
pub use roster::{
    score_companies, score_roster, CompanyProfile, RosterInput, RosterOutput, ScoredCompany,
};
