use serde::{Deserialize, Serialize};

/// One operand as the strategy saw it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperandTrace {
    pub value: f64,
    pub weight: f64,
    pub index: usize,
}

/// The outcome of one calculation, with provenance. Never mutated after the
/// strategy returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub value: f64,
    pub strategy: String,
    pub operands: Vec<OperandTrace>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl CalculationResult {
    /// A result whose trace gives every operand weight 1.0.
    pub fn unweighted(value: f64, strategy: &str, operands: &[f64]) -> Self {
        let trace = operands
            .iter()
            .enumerate()
            .map(|(index, &value)| OperandTrace {
                value,
                weight: 1.0,
                index,
            })
            .collect();
        Self::with_trace(value, strategy, trace)
    }

    pub fn with_trace(value: f64, strategy: &str, operands: Vec<OperandTrace>) -> Self {
        let mut metadata = serde_json::Map::new();
        metadata.insert("operand_count".to_string(), operands.len().into());
        Self {
            value,
            strategy: strategy.to_string(),
            operands,
            metadata,
        }
    }

    pub fn set_metadata(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.metadata.insert(key.to_string(), value.into());
    }

    pub fn metadata_f64(&self, key: &str) -> Option<f64> {
        self.metadata.get(key).and_then(|v| v.as_f64())
    }

    pub fn metadata_u64(&self, key: &str) -> Option<u64> {
        self.metadata.get(key).and_then(|v| v.as_u64())
    }
}
