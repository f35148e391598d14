//! Error types for the Handbook Assistant.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, LLM, knowledge, prompt, and the
//! degraded-collaborator conditions raised by generation and scraping.

use thiserror::Error;

/// Unified error type for the Handbook Assistant.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (missing files, unreadable YAML)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Retrieval thresholds out of range or inverted. Fatal at startup.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Document store and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// The answer generation service failed or timed out
    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),

    /// The scraper could not fetch usable content for a URL
    #[error("Fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Build a `FetchFailed` error for a URL.
    pub fn fetch_failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::FetchFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error describes a degraded collaborator rather than a bug.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            AppError::GenerationUnavailable(_) | AppError::FetchFailed { .. }
        )
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failed_display() {
        let err = AppError::fetch_failed("https://example.com", "timeout");
        assert_eq!(
            err.to_string(),
            "Fetch failed for https://example.com: timeout"
        );
        assert!(err.is_degraded());
    }

    #[test]
    fn test_invalid_configuration_is_not_degraded() {
        let err = AppError::InvalidConfiguration("high < medium".to_string());
        assert!(!err.is_degraded());
        assert!(err.to_string().contains("high < medium"));
    }

    #[test]
    fn test_from_serde_json() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: AppError = parse.unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
