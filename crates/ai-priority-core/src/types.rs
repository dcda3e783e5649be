use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Driver and derived scores on the nominal 1-10 scale.
pub type Score = Decimal;

/// Formula coefficients (0.35 = 35% of the blend).
pub type Weight = Decimal;

/// Rates expressed as decimals (0.15 = 15%). Never as percentages.
pub type Rate = Decimal;

/// Decimal places kept on value, readiness and priority scores.
pub const SCORE_DECIMAL_PLACES: u32 = 4;

/// Decimal places kept on monetary outputs (cents).
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Round a ratio score to its published precision (half away from zero).
pub fn round_score(value: Decimal) -> Score {
    value.round_dp_with_strategy(SCORE_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a monetary amount to cents (half away from zero).
pub fn round_money(value: Decimal) -> Money {
    value.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `total / count`, or zero for an empty set.
pub fn average_or_zero(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(count as u64)
    }
}

/// Value creation theme a company's AI program is aligned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValueTheme {
    #[serde(rename = "Revenue Growth")]
    RevenueGrowth,
    #[serde(rename = "Margin Expansion")]
    MarginExpansion,
    #[serde(rename = "Cost Cutting")]
    CostCutting,
}

impl ValueTheme {
    pub const ALL: [ValueTheme; 3] = [
        ValueTheme::RevenueGrowth,
        ValueTheme::MarginExpansion,
        ValueTheme::CostCutting,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ValueTheme::RevenueGrowth => "Revenue Growth",
            ValueTheme::MarginExpansion => "Margin Expansion",
            ValueTheme::CostCutting => "Cost Cutting",
        }
    }
}

impl std::fmt::Display for ValueTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Hold-period track a company's AI investment is sequenced into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HoldPeriodTrack {
    #[serde(rename = "EBITDA Accelerator")]
    EbitdaAccelerator,
    #[serde(rename = "Growth Enabler")]
    GrowthEnabler,
    #[serde(rename = "Exit Multiplier")]
    ExitMultiplier,
}

impl HoldPeriodTrack {
    /// Tracks in the order their value windows open.
    pub const ALL: [HoldPeriodTrack; 3] = [
        HoldPeriodTrack::EbitdaAccelerator,
        HoldPeriodTrack::GrowthEnabler,
        HoldPeriodTrack::ExitMultiplier,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HoldPeriodTrack::EbitdaAccelerator => "EBITDA Accelerator",
            HoldPeriodTrack::GrowthEnabler => "Growth Enabler",
            HoldPeriodTrack::ExitMultiplier => "Exit Multiplier",
        }
    }
}

impl std::fmt::Display for HoldPeriodTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a company's AI solution can be redeployed across the portfolio
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlatformClassification {
    #[serde(rename = "Platform Play")]
    PlatformPlay,
    #[serde(rename = "Point Solution")]
    PointSolution,
}

impl PlatformClassification {
    pub const ALL: [PlatformClassification; 2] = [
        PlatformClassification::PlatformPlay,
        PlatformClassification::PointSolution,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PlatformClassification::PlatformPlay => "Platform Play",
            PlatformClassification::PointSolution => "Point Solution",
        }
    }
}

impl std::fmt::Display for PlatformClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Priority tier of an AI use case; also used as friction-point severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriorityTier {
    Critical,
    High,
    Medium,
    Low,
}

impl PriorityTier {
    pub const ALL: [PriorityTier; 4] = [
        PriorityTier::Critical,
        PriorityTier::High,
        PriorityTier::Medium,
        PriorityTier::Low,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PriorityTier::Critical => "Critical",
            PriorityTier::High => "High",
            PriorityTier::Medium => "Medium",
            PriorityTier::Low => "Low",
        }
    }
}

impl std::fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
