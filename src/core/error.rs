//! Typed error handling for sift
//!
//! Validation failures are returned as error values; the library never logs
//! or panics on bad client input. Callers route errors by category: client
//! errors ("reject the request") versus programmer/configuration errors
//! ("fix the code"), distinguished via [`SiftError::is_client_error`].

use thiserror::Error;

/// The main error type for sift operations
#[derive(Debug, Error)]
pub enum SiftError {
    /// An operator name outside the fixed vocabulary was wired in by the
    /// caller (e.g. through a [`FilterItem`](crate::core::query::FilterItem)).
    ///
    /// This indicates a programming or configuration mistake, not bad client
    /// input: unknown operators in client payloads surface as
    /// [`SiftError::InvalidFilterKey`] instead.
    #[error("unsupported filter operator: '{operator}'")]
    UnsupportedOperator { operator: String },

    /// An operand failed the shape contract of a recognized operator
    #[error("invalid operand for '{operator}': {}", .messages.join("; "))]
    OperatorValidation {
        operator: String,
        messages: Vec<String>,
    },

    /// A filter key is neither a known model field nor a recognized operator
    #[error("unknown filter key: '{key}'")]
    InvalidFilterKey { key: String },

    /// A relation points at a model that was never registered
    #[error("unknown model: '{name}'")]
    UnknownModel { name: String },

    /// Configuration parsing or IO failure
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl SiftError {
    pub fn unsupported_operator(operator: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            operator: operator.into(),
        }
    }

    pub fn operator_validation(operator: impl Into<String>, messages: Vec<String>) -> Self {
        Self::OperatorValidation {
            operator: operator.into(),
            messages,
        }
    }

    pub fn invalid_filter_key(key: impl Into<String>) -> Self {
        Self::InvalidFilterKey { key: key.into() }
    }

    pub fn unknown_model(name: impl Into<String>) -> Self {
        Self::UnknownModel { name: name.into() }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            SiftError::UnsupportedOperator { .. } => "UNSUPPORTED_OPERATOR",
            SiftError::OperatorValidation { .. } => "OPERATOR_VALIDATION_ERROR",
            SiftError::InvalidFilterKey { .. } => "INVALID_FILTER_KEY",
            SiftError::UnknownModel { .. } => "UNKNOWN_MODEL",
            SiftError::Config { .. } => "CONFIG_ERROR",
        }
    }

    /// Whether this error should be reported back to the client as a bad
    /// request, as opposed to a server-side defect
    pub fn is_client_error(&self) -> bool {
        match self {
            SiftError::OperatorValidation { .. } | SiftError::InvalidFilterKey { .. } => true,
            SiftError::UnsupportedOperator { .. }
            | SiftError::UnknownModel { .. }
            | SiftError::Config { .. } => false,
        }
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_yaml::Error> for SiftError {
    fn from(err: serde_yaml::Error) -> Self {
        SiftError::Config {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for SiftError {
    fn from(err: std::io::Error) -> Self {
        SiftError::Config {
            message: err.to_string(),
        }
    }
}

/// A specialized Result type for sift operations
pub type SiftResult<T> = Result<T, SiftError>;

// =============================================================================
// Tests
// =============================================================================
