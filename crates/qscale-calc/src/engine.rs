use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Strategy;
use crate::error::CalcError;
use crate::registry::StrategyRegistry;
use crate::result::CalculationResult;
use crate::rule::CalculationRule;

/// Resolves a rule's strategy, validates operands, and runs it.
#[derive(Clone)]
pub struct CalculationEngine {
    registry: Arc<StrategyRegistry>,
}

/// One named calculation in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub name: String,
    pub operands: Vec<f64>,
    pub rule: Option<CalculationRule>,
}

/// Either a result or the error text; a batch never fails as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CalculationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CalculationEngine {
    pub fn new(registry: Arc<StrategyRegistry>) -> Self {
        Self { registry }
    }

    pub fn with_builtins() -> Self {
        Self::new(Arc::new(StrategyRegistry::with_builtins()))
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn calculate(
        &self,
        operands: &[f64],
        rule: Option<&CalculationRule>,
    ) -> Result<CalculationResult, CalcError> {
        let rule = rule.ok_or(CalcError::MissingRule)?;
        let strategy = self.registry.get(&rule.strategy)?;
        strategy.calculate(operands, rule)
    }

    /// Run a named strategy, building a default rule when none is given.
    pub fn calculate_with_strategy(
        &self,
        strategy_name: &str,
        operands: &[f64],
        rule: Option<&CalculationRule>,
    ) -> Result<CalculationResult, CalcError> {
        let strategy = self.registry.get(strategy_name)?;
        match rule {
            Some(rule) => strategy.calculate(operands, rule),
            None => strategy.calculate(operands, &CalculationRule::new(strategy_name)),
        }
    }

    pub fn validate_operands(
        &self,
        operands: &[f64],
        rule: Option<&CalculationRule>,
    ) -> Result<(), CalcError> {
        let rule = rule.ok_or(CalcError::MissingRule)?;
        self.registry.get(&rule.strategy)?.validate(operands, rule)
    }

    pub fn list_strategies(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn has_strategy(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Add a custom strategy. Only possible while this engine holds the
    /// sole reference to its registry, i.e. before it has been shared.
    pub fn register_strategy(&mut self, strategy: Arc<dyn Strategy>) -> Result<(), CalcError> {
        Arc::get_mut(&mut self.registry)
            .ok_or(CalcError::RegistryShared)?
            .register(strategy)
    }

    pub fn calculate_batch(&self, requests: &[BatchRequest]) -> Vec<BatchResult> {
        requests
            .iter()
            .map(|req| match self.calculate(&req.operands, req.rule.as_ref()) {
                Ok(result) => BatchResult {
                    name: req.name.clone(),
                    result: Some(result),
                    error: None,
                },
                Err(e) => BatchResult {
                    name: req.name.clone(),
                    result: None,
                    error: Some(e.to_string()),
                },
            })
            .collect()
    }
}

impl Default for CalculationEngine {
    fn default() -> Self {
        Self::with_builtins()
    }
}
