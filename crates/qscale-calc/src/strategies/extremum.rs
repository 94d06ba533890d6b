use crate::Strategy;
use crate::result::CalculationResult;
use crate::rule::CalculationRule;

/// Largest operand. Ties resolve to the earliest index.
pub struct Max;

/// Smallest operand. Ties resolve to the earliest index.
pub struct Min;

/// Index of the first operand that `better` prefers over all others.
fn pick(operands: &[f64], better: impl Fn(f64, f64) -> bool) -> usize {
    let mut best = 0;
    for (i, &v) in operands.iter().enumerate().skip(1) {
        if better(v, operands[best]) {
            best = i;
        }
    }
    best
}

impl Strategy for Max {
    fn name(&self) -> &str {
        "max"
    }

    fn description(&self) -> &str {
        "Largest operand"
    }

    fn compute(&self, operands: &[f64], rule: &CalculationRule) -> CalculationResult {
        let index = pick(operands, |candidate, best| candidate > best);
        let mut result =
            CalculationResult::unweighted(rule.round(operands[index]), self.name(), operands);
        result.set_metadata("max_index", index);
        result
    }
}

impl Strategy for Min {
    fn name(&self) -> &str {
        "min"
    }

    fn description(&self) -> &str {
        "Smallest operand"
    }

    fn compute(&self, operands: &[f64], rule: &CalculationRule) -> CalculationResult {
        let index = pick(operands, |candidate, best| candidate < best);
        let mut result =
            CalculationResult::unweighted(rule.round(operands[index]), self.name(), operands);
        result.set_metadata("min_index", index);
        result
    }
}
