use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalScale {
    pub code: String,
    #[serde(default)]
    pub questionnaire_code: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub factors: Vec<Factor>,
}

impl MedicalScale {
    pub fn factor(&self, code: &str) -> Option<&Factor> {
        self.factors.iter().find(|f| f.code == code)
    }
}

/// The tier a factor is computed in. Primary factors read answer scores;
/// multilevel factors read primary factor scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorType {
    #[serde(alias = "first_grade")]
    Primary,
    #[serde(alias = "second_grade")]
    Multilevel,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Factor {
    pub code: String,
    #[serde(default)]
    pub title: String,
    pub factor_type: FactorType,
    #[serde(default)]
    pub is_total_score: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_rule: Option<FactorCalculationRule>,
    #[serde(default)]
    pub interpretation_rules: Vec<InterpretationRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorCalculationRule {
    pub formula_type: String,
    /// Question codes for primary factors, factor codes for multilevel ones.
    #[serde(default)]
    pub source_codes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weights: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpretationRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_range: Option<ScoreRange>,
    pub content: String,
}

/// A half-open score interval `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    #[serde(alias = "min_score")]
    pub min: f64,
    #[serde(alias = "max_score")]
    pub max: f64,
}

impl ScoreRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }
}
