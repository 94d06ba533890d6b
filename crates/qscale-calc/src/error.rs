use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("calculation rule is missing")]
    MissingRule,

    #[error("formula type is empty")]
    EmptyFormulaType,

    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("strategy already registered: {0}")]
    DuplicateStrategy(String),

    #[error("strategy registry is shared and can no longer be modified")]
    RegistryShared,

    #[error("{strategy}: expected {} operands, got {actual}", describe_limits(.min, .max))]
    OperandCount {
        strategy: String,
        actual: usize,
        min: usize,
        max: Option<usize>,
    },

    #[error("{strategy}: operand[{index}] is not a finite number")]
    NonFiniteOperand { strategy: String, index: usize },

    #[error("{strategy}: {weights} weights do not match {operands} operands")]
    WeightCount {
        strategy: String,
        weights: usize,
        operands: usize,
    },

    #[error("{strategy}: weight[{index}] = {weight} must be positive")]
    NonPositiveWeight {
        strategy: String,
        index: usize,
        weight: f64,
    },
}

impl CalcError {
    /// Configuration errors come from the rule or registry, not the data.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingRule
                | Self::EmptyFormulaType
                | Self::UnknownStrategy(_)
                | Self::DuplicateStrategy(_)
                | Self::RegistryShared
        )
    }
}

fn describe_limits(min: &usize, max: &Option<usize>) -> String {
    match max {
        Some(max) if max == min => format!("exactly {min}"),
        Some(max) => format!("{min}..={max}"),
        None => format!("at least {min}"),
    }
}
