use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::weights::WeightConfig;

/// A named coefficient as shown next to a formula
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightTerm {
    pub name: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaEntry {
    /// Stable identifier, e.g. "value_score"
    pub key: String,
    pub formula: String,
    pub weights: Vec<WeightTerm>,
    pub rationale: String,
}

/// Human-readable description of every formula the engine evaluates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaDocumentation {
    pub weights_version: u32,
    pub formulas: Vec<FormulaEntry>,
}

impl FormulaDocumentation {
    pub fn get(&self, key: &str) -> Option<&FormulaEntry> {
        self.formulas.iter().find(|f| f.key == key)
    }
}

fn term(name: &str, value: Decimal) -> WeightTerm {
    WeightTerm {
        name: name.to_string(),
        value,
    }
}

fn pct(rate: Decimal) -> Decimal {
    (rate * Decimal::ONE_HUNDRED).normalize()
}

/// Render the formula table from `weights`, so the documentation always
/// shows the coefficients the calculator actually uses.
pub fn formula_documentation(weights: &WeightConfig) -> FormulaDocumentation {
    let v = &weights.value;
    let r = &weights.readiness;
    let p = &weights.priority;

    let formulas = vec![
        FormulaEntry {
            key: "value_score".into(),
            formula: format!(
                "Value_Score = (EBITDA_Impact × {}) + (Revenue_Enablement × {}) + \
                 (Risk_Reduction × {})",
                v.ebitda_impact, v.revenue_enablement, v.risk_reduction
            ),
            weights: vec![
                term("ebitda_impact", v.ebitda_impact),
                term("revenue_enablement", v.revenue_enablement),
                term("risk_reduction", v.risk_reduction),
            ],
            rationale: "Measures the potential value creation from AI initiatives".into(),
        },
        FormulaEntry {
            key: "readiness_score".into(),
            formula: format!(
                "Readiness_Score = (Org_Capacity × {}) + (Data_Quality × {}) + \
                 (Tech_Infrastructure × {}) + (Timeline_Fit × {})",
                r.org_capacity, r.data_quality, r.tech_infrastructure, r.timeline_fit
            ),
            weights: vec![
                term("org_capacity", r.org_capacity),
                term("data_quality", r.data_quality),
                term("tech_infrastructure", r.tech_infrastructure),
                term("timeline_fit", r.timeline_fit),
            ],
            rationale: "Measures organizational readiness to implement AI initiatives".into(),
        },
        FormulaEntry {
            key: "priority_score".into(),
            formula: format!(
                "Priority_Score = (Value_Score × {}) + (Readiness_Score × {})",
                p.value, p.readiness
            ),
            weights: vec![term("value", p.value), term("readiness", p.readiness)],
            rationale: "Combined score for prioritizing AI investments".into(),
        },
        FormulaEntry {
            key: "adjusted_ebitda".into(),
            formula: format!(
                "Adjusted_EBITDA = EBITDA × {} × (Value_Score / {})",
                weights.ebitda_base_assumption, weights.ebitda_normalization_anchor
            ),
            weights: vec![
                term("ebitda_base_assumption", weights.ebitda_base_assumption),
                term("ebitda_normalization_anchor", weights.ebitda_normalization_anchor),
            ],
            rationale: format!(
                "Estimated EBITDA impact from AI initiatives; {}% of EBITDA \
                 (Bain benchmark midpoint) at a value score of {}",
                pct(weights.ebitda_base_assumption),
                weights.ebitda_normalization_anchor
            ),
        },
        FormulaEntry {
            key: "adjusted_priority".into(),
            formula: "Adjusted_Priority = Priority_Score × Adjusted_EBITDA".into(),
            weights: Vec::new(),
            rationale: "Priority weighted by financial impact".into(),
        },
        FormulaEntry {
            key: "portfolio_adjusted_priority".into(),
            formula: format!(
                "Portfolio_Adjusted_Priority = Adjusted_Priority × \
                 (1 + (Replication_Potential × {}))",
                weights.replication_multiplier
            ),
            weights: vec![
                term("replication_multiplier", weights.replication_multiplier),
                term("default_replication_potential", weights.default_replication_potential),
            ],
            rationale: format!(
                "Priority adjusted for cross-portfolio replication potential; \
                 {}% per replication potential point, {} assumed when not scored",
                pct(weights.replication_multiplier),
                weights.default_replication_potential
            ),
        },
        FormulaEntry {
            key: "quadrant_threshold".into(),
            formula: format!(
                "High when score >= {}; Champions = High value and High readiness",
                weights.quadrant_threshold
            ),
            weights: vec![term("quadrant_threshold", weights.quadrant_threshold)],
            rationale: format!(
                "Score of {} ({}%) defines \"High\" classification for quadrant placement",
                weights.quadrant_threshold,
                (weights.quadrant_threshold * Decimal::TEN).normalize()
            ),
        },
    ];

    FormulaDocumentation {
        weights_version: weights.version,
        formulas,
    }
}
