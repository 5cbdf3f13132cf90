use thiserror::Error;

#[derive(Debug, Error)]
pub enum MortgageError {
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Unknown output: {0}")]
    UnknownOutput(String),

    #[error("Output {output} does not depend on parameter {parameter}")]
    ParameterNotRelevant { parameter: String, output: String },

    #[error("Domain error in {function}: {precondition}")]
    DomainError {
        function: String,
        precondition: String,
    },

    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl MortgageError {
    pub(crate) fn domain(function: &str, precondition: impl Into<String>) -> Self {
        MortgageError::DomainError {
            function: function.to_string(),
            precondition: precondition.into(),
        }
    }

    /// True for per-evaluation failures that a sweep may recover from locally.
    pub fn is_domain_error(&self) -> bool {
        matches!(self, MortgageError::DomainError { .. })
    }
}

impl From<serde_json::Error> for MortgageError {
    fn from(e: serde_json::Error) -> Self {
        MortgageError::SerializationError(e.to_string())
    }
}

impl From<csv::Error> for MortgageError {
    fn from(e: csv::Error) -> Self {
        MortgageError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for MortgageError {
    fn from(e: std::io::Error) -> Self {
        MortgageError::Io(e.to_string())
    }
}
