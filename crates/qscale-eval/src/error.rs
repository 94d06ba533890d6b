use std::time::Duration;

use thiserror::Error;

use qscale_core::error::CoreError;
use qscale_store::StoreError;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("{operation} failed: {source}")]
    Collaborator {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("invalid message: {0}")]
    InvalidMessage(#[source] CoreError),

    #[error("handler {handler} failed: {source}")]
    Handler {
        handler: &'static str,
        #[source]
        source: Box<EvalError>,
    },

    #[error("interpretation content missing for factor {factor_code}")]
    MissingContent { factor_code: String },
}

impl EvalError {
    /// True for failures that a later redelivery may fix.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Collaborator { source, .. } => {
                matches!(source, StoreError::Io(_) | StoreError::Unavailable(_))
            }
            Self::Handler { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}
