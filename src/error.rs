//! Domain-specific error types for affinity-quiz

use thiserror::Error;

use crate::clients::OracleError;

/// Main error type for the quiz scoring pipeline
#[derive(Error, Debug)]
pub enum AffinityError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Oracle error: {message}")]
    Oracle { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Timeout error: {operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Archetype catalog is empty")]
    EmptyCatalog,

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<anyhow::Error> for AffinityError {
    fn from(err: anyhow::Error) -> Self {
        AffinityError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AffinityError {
    fn from(err: serde_json::Error) -> Self {
        AffinityError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for AffinityError {
    fn from(err: reqwest::Error) -> Self {
        AffinityError::Oracle {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

impl From<OracleError> for AffinityError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::Timeout { timeout_ms } => AffinityError::Timeout {
                operation: "oracle call".to_string(),
                timeout_ms,
            },
            other => AffinityError::Oracle {
                message: other.to_string(),
            },
        }
    }
}

impl From<std::io::Error> for AffinityError {
    fn from(err: std::io::Error) -> Self {
        AffinityError::Config {
            message: format!("I/O error: {}", err),
        }
    }
}

/// Result type alias for affinity-quiz operations
pub type Result<T> = std::result::Result<T, AffinityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oracle_timeout_maps_to_timeout_variant() {
        let err: AffinityError = OracleError::Timeout { timeout_ms: 250 }.into();
        assert!(matches!(
            err,
            AffinityError::Timeout {
                timeout_ms: 250,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "Timeout error: oracle call timed out after 250ms"
        );
    }

    #[test]
    fn empty_catalog_message() {
        assert_eq!(
            AffinityError::EmptyCatalog.to_string(),
            "Archetype catalog is empty"
        );
    }
}
