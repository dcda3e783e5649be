pub mod aggregator;

pub use aggregator::{
    aggregate_portfolio, fold_records, AssessmentFinancials, PortfolioMetrics, PortfolioRecord,
    PortfolioTotals, QuadrantCounts, TierCounts, UseCaseSummary, RECORD_MAGNITUDE_LIMIT,
};
