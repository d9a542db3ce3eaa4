//! Per-provider settings from TOML (`[anthropic]`, `[openai]`, `[azure_openai]`)

use secreview_domain::{ConfigIssue, ConfigIssueCode, ModelProvider};
use serde::{Deserialize, Serialize};

/// Anthropic API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnthropicConfig {
    /// Environment variable name for the API key (default: "ANTHROPIC_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    /// Base URL for the Anthropic API.
    pub base_url: String,
}

impl Default for FileAnthropicConfig {
    fn default() -> Self {
        Self {
            api_key_env: ModelProvider::Anthropic.api_key_env().to_string(),
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
        }
    }
}

/// OpenAI API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    /// Base URL for the OpenAI API (or an OpenAI-compatible server).
    pub base_url: String,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: ModelProvider::OpenAi.api_key_env().to_string(),
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
        }
    }
}

/// Azure OpenAI configuration.
///
/// `endpoint` is the full resource URL, e.g.
/// `https://my-resource.openai.azure.com/`. The model name is used as the
/// deployment name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAzureOpenAiConfig {
    /// Environment variable name for the API key (default: "AZURE_OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    /// AZURE_OPENAI_ENDPOINT
    pub endpoint: Option<String>,
    /// AZURE_OPENAI_API_VERSION; unset means `2025-01-01-preview`
    pub api_version: Option<String>,
}

impl Default for FileAzureOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: ModelProvider::AzureOpenAi.api_key_env().to_string(),
            api_key: None,
            endpoint: None,
            api_version: None,
        }
    }
}

impl FileAzureOpenAiConfig {
    /// The endpoint, if set to something non-blank
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }

    /// The API version, if set to something non-blank
    pub fn api_version(&self) -> Option<&str> {
        self.api_version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Warn when a key is written into a config file instead of the environment.
pub(super) fn inline_key_issue(section: &str, api_key: &Option<String>) -> Option<ConfigIssue> {
    api_key.as_ref().map(|_| {
        ConfigIssue::warning(
            ConfigIssueCode::InlineApiKey {
                section: section.to_string(),
            },
            format!(
                "{}.api_key: API key stored in a config file; prefer api_key_env",
                section
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_endpoint_is_unset() {
        let config = FileAzureOpenAiConfig {
            endpoint: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.endpoint(), None);
    }

    #[test]
    fn test_inline_key_warning() {
        assert!(inline_key_issue("openai", &None).is_none());
        let issue = inline_key_issue("openai", &Some("sk-test".to_string())).unwrap();
        assert!(!issue.is_error());
        assert!(!issue.message.contains("sk-test"));
    }
}
