use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("interpret item '{factor_code}' has no score yet; content must follow the score")]
    ContentBeforeScore { factor_code: String },
}
