use std::collections::HashMap;
use std::sync::Arc;

use crate::error::CalcError;
use crate::{Strategy, builtin_strategies};

/// Name-keyed lookup table of strategies.
///
/// Built once by the composition root and then shared read-only behind an
/// `Arc`. Registration takes `&mut self`, so it cannot interleave with
/// lookups once the registry is shared.
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn Strategy>>,
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for strategy in builtin_strategies() {
            registry
                .strategies
                .insert(strategy.name().to_string(), strategy);
        }
        registry
    }

    pub fn register(&mut self, strategy: Arc<dyn Strategy>) -> Result<(), CalcError> {
        let name = strategy.name().to_string();
        if self.strategies.contains_key(&name) {
            return Err(CalcError::DuplicateStrategy(name));
        }
        tracing::debug!(strategy = %name, "registered strategy");
        self.strategies.insert(name, strategy);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&dyn Strategy, CalcError> {
        self.strategies
            .get(name)
            .map(|s| s.as_ref())
            .ok_or_else(|| CalcError::UnknownStrategy(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.strategies.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
