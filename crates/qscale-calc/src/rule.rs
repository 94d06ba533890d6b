use serde::{Deserialize, Serialize};

pub const DEFAULT_PRECISION: u32 = 2;

/// Beyond this many decimal places `10^precision` stops being exact.
const MAX_PRECISION: u32 = 15;

/// Relative distance under which a scaled value is treated as an integer.
/// Products like `1.1 * 100` land a hair off; snapping them keeps rounding
/// idempotent for ceil and floor.
const SNAP_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Half away from zero.
    #[default]
    Round,
    Ceil,
    Floor,
}

impl RoundingMode {
    /// `round(value * 10^precision) / 10^precision` in this mode.
    pub fn apply(self, value: f64, precision: u32) -> f64 {
        if !value.is_finite() {
            return value;
        }
        let factor = 10f64.powi(precision.min(MAX_PRECISION) as i32);
        let mut scaled = value * factor;
        let nearest = scaled.round();
        if (scaled - nearest).abs() <= SNAP_TOLERANCE * nearest.abs().max(1.0) {
            scaled = nearest;
        }
        let rounded = match self {
            Self::Round => scaled.round(),
            Self::Ceil => scaled.ceil(),
            Self::Floor => scaled.floor(),
        };
        rounded / factor
    }
}

/// How a strategy is applied: which one, rounding, operand limits, weights,
/// and free-form parameters. Read-only at calculation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRule {
    pub strategy: String,
    #[serde(default = "default_precision")]
    pub precision: u32,
    #[serde(default)]
    pub rounding: RoundingMode,
    /// 0 = the strategy's default.
    #[serde(default)]
    pub min_operands: usize,
    /// 0 = the strategy's default.
    #[serde(default)]
    pub max_operands: usize,
    #[serde(default)]
    pub weights: Vec<f64>,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

fn default_precision() -> u32 {
    DEFAULT_PRECISION
}

impl CalculationRule {
    pub fn new(strategy: &str) -> Self {
        Self {
            strategy: strategy.to_string(),
            precision: DEFAULT_PRECISION,
            rounding: RoundingMode::default(),
            min_operands: 0,
            max_operands: 0,
            weights: Vec::new(),
            params: serde_json::Map::new(),
        }
    }

    pub fn sum() -> Self {
        Self::new("sum")
    }

    pub fn average() -> Self {
        Self::new("average")
    }

    pub fn max() -> Self {
        Self::new("max")
    }

    pub fn min() -> Self {
        Self::new("min")
    }

    pub fn option() -> Self {
        Self::new("option").with_operand_limits(1, 1)
    }

    pub fn option_with_max(max_operands: usize) -> Self {
        Self::new("option").with_operand_limits(1, max_operands)
    }

    pub fn weighted(weights: Vec<f64>) -> Self {
        Self::new("weighted").with_weights(weights)
    }

    pub fn weighted_average(weights: Vec<f64>) -> Self {
        Self::weighted(weights).with_param("calculation_type", "weighted_average")
    }

    pub fn weighted_sum(weights: Vec<f64>) -> Self {
        Self::weighted(weights).with_param("calculation_type", "weighted_sum")
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_operand_limits(mut self, min: usize, max: usize) -> Self {
        self.min_operands = min;
        self.max_operands = max;
        self
    }

    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_param(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.as_str())
    }

    /// Apply this rule's precision and rounding mode.
    pub fn round(&self, value: f64) -> f64 {
        self.rounding.apply(value, self.precision)
    }
}
