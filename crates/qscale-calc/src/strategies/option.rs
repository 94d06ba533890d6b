use crate::result::CalculationResult;
use crate::rule::CalculationRule;
use crate::{OperandLimits, Strategy};

/// Single-choice passthrough: the selected option's score, unchanged.
pub struct OptionPassthrough;

impl Strategy for OptionPassthrough {
    fn name(&self) -> &str {
        "option"
    }

    fn description(&self) -> &str {
        "Score of the single selected option"
    }

    fn default_limits(&self) -> OperandLimits {
        OperandLimits::EXACTLY_ONE
    }

    fn compute(&self, operands: &[f64], _rule: &CalculationRule) -> CalculationResult {
        CalculationResult::unweighted(operands[0], self.name(), operands)
    }
}
