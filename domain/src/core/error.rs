//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unsupported provider '{provider}'. Supported providers: {supported}")]
    UnsupportedProvider { provider: String, supported: String },

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("API key not found. Please set {0} environment variable")]
    MissingCredential(String),

    #[error("Prompt cannot be empty")]
    EmptyPrompt,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_names_variable() {
        let error = DomainError::MissingCredential("OPENAI_API_KEY".to_string());
        assert_eq!(
            error.to_string(),
            "API key not found. Please set OPENAI_API_KEY environment variable"
        );
    }

    #[test]
    fn test_invalid_endpoint_display() {
        let error = DomainError::InvalidEndpoint {
            endpoint: "my-resource".to_string(),
            reason: "missing scheme".to_string(),
        };
        assert!(error.to_string().contains("my-resource"));
        assert!(error.to_string().contains("missing scheme"));
    }
}
