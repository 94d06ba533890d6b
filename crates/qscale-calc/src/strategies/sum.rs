use crate::Strategy;
use crate::result::CalculationResult;
use crate::rule::CalculationRule;

/// Arithmetic total of all operands.
pub struct Sum;

impl Strategy for Sum {
    fn name(&self) -> &str {
        "sum"
    }

    fn description(&self) -> &str {
        "Total of all operands"
    }

    fn compute(&self, operands: &[f64], rule: &CalculationRule) -> CalculationResult {
        let sum: f64 = operands.iter().sum();
        let mut result = CalculationResult::unweighted(rule.round(sum), self.name(), operands);
        result.set_metadata("raw_sum", sum);
        result
    }
}
