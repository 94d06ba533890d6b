use crate::Strategy;
use crate::result::CalculationResult;
use crate::rule::CalculationRule;

/// Arithmetic mean, rounded per the rule.
pub struct Average;

impl Strategy for Average {
    fn name(&self) -> &str {
        "average"
    }

    fn description(&self) -> &str {
        "Mean of all operands"
    }

    fn compute(&self, operands: &[f64], rule: &CalculationRule) -> CalculationResult {
        let sum: f64 = operands.iter().sum();
        let average = sum / operands.len() as f64;
        let mut result = CalculationResult::unweighted(rule.round(average), self.name(), operands);
        result.set_metadata("sum", sum);
        result.set_metadata("raw_average", average);
        result
    }
}
