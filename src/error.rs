//! Error types for the SIGMA Lucene crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SigmaError>;

/// Errors raised while compiling a condition tree or rendering an envelope.
///
/// Every error is scoped to a single rule: batch conversion reports it in the
/// slot of the failing rule and keeps going with the others.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SigmaError {
    /// The match node asks for a comparison Lucene cannot express.
    #[error("Unsupported comparator '{comparator}' on field '{field}'")]
    UnsupportedComparator { field: String, comparator: String },

    /// A compound node with no operands, or a match node with no values.
    #[error("Malformed condition: {0}")]
    MalformedCondition(String),

    /// The rule level has no entry in the risk score table.
    #[error("Unmapped severity: {0}")]
    UnmappedSeverity(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SigmaError {
    fn from(err: serde_json::Error) -> Self {
        SigmaError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for SigmaError {
    fn from(err: serde_yaml::Error) -> Self {
        SigmaError::Config(err.to_string())
    }
}

impl From<std::io::Error> for SigmaError {
    fn from(err: std::io::Error) -> Self {
        SigmaError::Config(err.to_string())
    }
}
