//! Mapping from the formula tags stored on questions and factors to
//! registry strategy names.

use crate::error::CalcError;
use crate::registry::StrategyRegistry;
use crate::rule::CalculationRule;

/// Fallback for tags nobody recognizes.
pub const FALLBACK_STRATEGY: &str = "option";

/// Resolve a case-sensitive formula tag to a strategy name.
///
/// Built-in aliases win; otherwise a tag naming a registered strategy is
/// used as-is. Anything else falls back to `option` with a warning. An empty
/// tag is a configuration error.
pub fn resolve_formula_type(tag: &str, registry: &StrategyRegistry) -> Result<String, CalcError> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(CalcError::EmptyFormulaType);
    }

    let builtin = match tag {
        "the_option" | "score" | "option" => Some("option"),
        "sum" => Some("sum"),
        "average" | "avg" => Some("average"),
        "max" | "maximum" => Some("max"),
        "min" | "minimum" => Some("min"),
        "weighted" | "weighted_average" => Some("weighted"),
        _ => None,
    };
    if let Some(name) = builtin {
        return Ok(name.to_string());
    }

    if registry.contains(tag) {
        return Ok(tag.to_string());
    }

    tracing::warn!(
        formula_type = tag,
        fallback = FALLBACK_STRATEGY,
        "unrecognized formula type, falling back"
    );
    Ok(FALLBACK_STRATEGY.to_string())
}

/// A default rule for a formula tag.
pub fn rule_for_formula(tag: &str, registry: &StrategyRegistry) -> Result<CalculationRule, CalcError> {
    let name = resolve_formula_type(tag, registry)?;
    Ok(CalculationRule::new(&name))
}
