//! qscale-calc
//!
//! Numeric scoring strategies and the engine that runs them. Pure and
//! synchronous: no I/O, no async runtime. Defines the strategy contract,
//! the built-in strategies, rounding, and the strategy registry.

pub mod engine;
pub mod error;
pub mod formula;
pub mod registry;
pub mod result;
pub mod rule;
pub mod strategies;

use std::sync::Arc;

use error::CalcError;
use result::CalculationResult;
use rule::CalculationRule;

/// Operand-count bounds a strategy falls back to when the rule leaves them
/// at zero. `max: None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandLimits {
    pub min: usize,
    pub max: Option<usize>,
}

impl OperandLimits {
    pub const AT_LEAST_ONE: Self = Self { min: 1, max: None };
    pub const EXACTLY_ONE: Self = Self {
        min: 1,
        max: Some(1),
    };
}

/// Trait implemented by each named, stateless scoring strategy.
pub trait Strategy: Send + Sync {
    /// Registry key (e.g., "sum", "weighted").
    fn name(&self) -> &str;

    /// Human-readable summary.
    fn description(&self) -> &str;

    /// Limits applied when the rule does not set its own.
    fn default_limits(&self) -> OperandLimits {
        OperandLimits::AT_LEAST_ONE
    }

    /// Check operands against the rule before any arithmetic runs.
    fn validate(&self, operands: &[f64], rule: &CalculationRule) -> Result<(), CalcError> {
        check_operands(self.name(), self.default_limits(), operands, rule)
    }

    /// The arithmetic itself. Callers go through [`Strategy::calculate`].
    fn compute(&self, operands: &[f64], rule: &CalculationRule) -> CalculationResult;

    fn calculate(
        &self,
        operands: &[f64],
        rule: &CalculationRule,
    ) -> Result<CalculationResult, CalcError> {
        self.validate(operands, rule)?;
        Ok(self.compute(operands, rule))
    }
}

/// Shared operand checks: count within limits, every value finite.
pub fn check_operands(
    strategy: &str,
    defaults: OperandLimits,
    operands: &[f64],
    rule: &CalculationRule,
) -> Result<(), CalcError> {
    let min = if rule.min_operands > 0 {
        rule.min_operands
    } else {
        defaults.min
    };
    let max = if rule.max_operands > 0 {
        Some(rule.max_operands)
    } else {
        defaults.max
    };

    let count = operands.len();
    if count < min || max.is_some_and(|m| count > m) {
        return Err(CalcError::OperandCount {
            strategy: strategy.to_string(),
            actual: count,
            min,
            max,
        });
    }

    if let Some(index) = operands.iter().position(|v| !v.is_finite()) {
        return Err(CalcError::NonFiniteOperand {
            strategy: strategy.to_string(),
            index,
        });
    }
    Ok(())
}

/// The six built-in strategies.
pub fn builtin_strategies() -> Vec<Arc<dyn Strategy>> {
    vec![
        Arc::new(strategies::sum::Sum),
        Arc::new(strategies::average::Average),
        Arc::new(strategies::extremum::Max),
        Arc::new(strategies::extremum::Min),
        Arc::new(strategies::option::OptionPassthrough),
        Arc::new(strategies::weighted::Weighted),
    ]
}
