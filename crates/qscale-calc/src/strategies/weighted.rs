use crate::Strategy;
use crate::error::CalcError;
use crate::result::{CalculationResult, OperandTrace};
use crate::rule::CalculationRule;

pub const WEIGHTED_AVERAGE: &str = "weighted_average";
pub const WEIGHTED_SUM: &str = "weighted_sum";

/// Weighted average (default) or weighted sum, selected by the
/// `calculation_type` rule parameter. No weights means uniform 1.0.
pub struct Weighted;

impl Weighted {
    fn weights(operands: &[f64], rule: &CalculationRule) -> Vec<f64> {
        if rule.weights.is_empty() {
            vec![1.0; operands.len()]
        } else {
            rule.weights.clone()
        }
    }
}

impl Strategy for Weighted {
    fn name(&self) -> &str {
        "weighted"
    }

    fn description(&self) -> &str {
        "Weighted average or weighted sum of the operands"
    }

    fn validate(&self, operands: &[f64], rule: &CalculationRule) -> Result<(), CalcError> {
        crate::check_operands(self.name(), self.default_limits(), operands, rule)?;

        if !rule.weights.is_empty() && rule.weights.len() != operands.len() {
            return Err(CalcError::WeightCount {
                strategy: self.name().to_string(),
                weights: rule.weights.len(),
                operands: operands.len(),
            });
        }
        if let Some((index, &weight)) = rule
            .weights
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w <= 0.0)
        {
            return Err(CalcError::NonPositiveWeight {
                strategy: self.name().to_string(),
                index,
                weight,
            });
        }
        Ok(())
    }

    fn compute(&self, operands: &[f64], rule: &CalculationRule) -> CalculationResult {
        let weights = Self::weights(operands, rule);

        let weighted_sum: f64 = operands.iter().zip(&weights).map(|(v, w)| v * w).sum();
        let total_weight: f64 = weights.iter().sum();

        let calculation_type = match rule.param_str("calculation_type") {
            Some(WEIGHTED_SUM) | Some("sum") => WEIGHTED_SUM,
            _ => WEIGHTED_AVERAGE,
        };
        let value = if calculation_type == WEIGHTED_SUM {
            weighted_sum
        } else {
            weighted_sum / total_weight
        };

        let trace = operands
            .iter()
            .zip(&weights)
            .enumerate()
            .map(|(index, (&value, &weight))| OperandTrace {
                value,
                weight,
                index,
            })
            .collect();

        let mut result = CalculationResult::with_trace(rule.round(value), self.name(), trace);
        result.set_metadata("calculation_type", calculation_type);
        result.set_metadata("weighted_sum", weighted_sum);
        result.set_metadata("total_weight", total_weight);
        result.set_metadata("weights", weights);
        result
    }
}
