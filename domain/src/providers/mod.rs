//! Provider client configuration types (provider-neutral, serde-free).
//!
//! These types define the resolved settings a client is built from, without
//! depending on any serialization format (TOML, env, etc.).

pub mod retry;

use crate::core::error::DomainError;
use crate::core::model::Model;
use crate::core::provider::ModelProvider;
use std::time::Duration;

pub use retry::RetryPolicy;

/// Default Azure OpenAI REST API version.
pub const DEFAULT_AZURE_API_VERSION: &str = "2025-01-01-preview";

/// Opaque API key.
///
/// Passed through unmodified to the provider; `Debug` never shows it.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Expose the raw key for request headers
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Azure OpenAI resource settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureSettings {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com/`.
    pub endpoint: String,
    /// REST API version query parameter.
    pub api_version: String,
}

impl AzureSettings {
    /// Create settings after validating the endpoint shape.
    pub fn new(
        endpoint: impl Into<String>,
        api_version: Option<String>,
    ) -> Result<Self, DomainError> {
        let endpoint = endpoint.into();
        validate_endpoint(&endpoint)?;
        Ok(Self {
            endpoint,
            api_version: api_version
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string()),
        })
    }

    /// Endpoint without trailing slashes
    pub fn normalized_endpoint(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

/// Check that an endpoint is an absolute http(s) URL with a host.
pub fn validate_endpoint(endpoint: &str) -> Result<(), DomainError> {
    let invalid = |reason: &str| DomainError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = endpoint.trim();
    if trimmed.is_empty() {
        return Err(invalid("endpoint is empty"));
    }

    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .ok_or_else(|| invalid("must start with https://"))?;

    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return Err(invalid("missing host name"));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }

    Ok(())
}

/// Fully resolved configuration for one AI model client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub provider: ModelProvider,
    pub model: Model,
    pub api_key: ApiKey,
    /// Per-request HTTP timeout (default: 180s).
    pub timeout: Duration,
    /// Attempts per `call_with_retry` (default: 3).
    pub max_retries: u32,
    /// Max tokens per response when the request doesn't say (default: 16384).
    pub max_tokens: u32,
    /// Sampling temperature for chat-completions providers (default: 0.1).
    pub temperature: f32,
    /// Base URL override (Anthropic/OpenAI); `None` uses the public API.
    pub base_url: Option<String>,
    /// Required when `provider` is Azure OpenAI.
    pub azure: Option<AzureSettings>,
}

impl ClientConfig {
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 180;
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
    pub const DEFAULT_MAX_TOKENS: u32 = 16384;
    pub const DEFAULT_TEMPERATURE: f32 = 0.1;

    /// Create a config with default limits and the provider's default model.
    pub fn new(provider: ModelProvider, api_key: ApiKey) -> Self {
        Self {
            provider,
            model: provider.default_model(),
            api_key,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECONDS),
            max_retries: Self::DEFAULT_MAX_RETRIES,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            temperature: Self::DEFAULT_TEMPERATURE,
            base_url: None,
            azure: None,
        }
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_azure(mut self, azure: AzureSettings) -> Self {
        self.azure = Some(azure);
        self
    }

    /// Retry policy derived from `max_retries`
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-very-secret");
        let printed = format!("{:?}", key);
        assert!(!printed.contains("sk-very-secret"));
        assert_eq!(key.expose(), "sk-very-secret");
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::new(ModelProvider::OpenAi, ApiKey::new("k"));
        assert_eq!(config.model, Model::Gpt4o);
        assert_eq!(config.timeout, Duration::from_secs(180));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.max_tokens, 16384);
        assert!(config.azure.is_none());
    }

    #[test]
    fn test_max_retries_never_zero() {
        let config =
            ClientConfig::new(ModelProvider::Anthropic, ApiKey::new("k")).with_max_retries(0);
        assert_eq!(config.max_retries, 1);
    }

    #[test]
    fn test_azure_settings_default_version() {
        let azure = AzureSettings::new("https://res.openai.azure.com/", None).unwrap();
        assert_eq!(azure.api_version, "2025-01-01-preview");
        assert_eq!(azure.normalized_endpoint(), "https://res.openai.azure.com");
    }

    #[test]
    fn test_azure_settings_blank_version_uses_default() {
        let azure =
            AzureSettings::new("https://res.openai.azure.com", Some("  ".to_string())).unwrap();
        assert_eq!(azure.api_version, DEFAULT_AZURE_API_VERSION);
    }

    #[test]
    fn test_validate_endpoint_rejects_bare_host() {
        assert!(validate_endpoint("my-resource.openai.azure.com").is_err());
        assert!(validate_endpoint("https://").is_err());
        assert!(validate_endpoint("").is_err());
        assert!(validate_endpoint("https://res.openai.azure.com/").is_ok());
        assert!(validate_endpoint("http://127.0.0.1:8080").is_ok());
    }
}
