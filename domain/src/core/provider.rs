//! AI provider value object

use super::error::DomainError;
use super::model::Model;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Supported AI completion providers (Value Object)
///
/// The set is closed: every provider has a dedicated client in the
/// infrastructure layer and a default model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelProvider {
    #[default]
    Anthropic,
    OpenAi,
    AzureOpenAi,
}

impl ModelProvider {
    /// All providers, in display order
    pub const ALL: [ModelProvider; 3] = [
        ModelProvider::Anthropic,
        ModelProvider::OpenAi,
        ModelProvider::AzureOpenAi,
    ];

    /// Get the configuration identifier for this provider
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelProvider::Anthropic => "anthropic",
            ModelProvider::OpenAi => "openai",
            ModelProvider::AzureOpenAi => "azure_openai",
        }
    }

    /// Human-readable vendor name, used in error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelProvider::Anthropic => "Anthropic",
            ModelProvider::OpenAi => "OpenAI",
            ModelProvider::AzureOpenAi => "Azure OpenAI",
        }
    }

    /// Identifiers of every supported provider
    pub fn supported() -> Vec<&'static str> {
        Self::ALL.iter().map(|p| p.as_str()).collect()
    }

    /// Model used when none is configured
    pub fn default_model(&self) -> Model {
        match self {
            ModelProvider::Anthropic => Model::ClaudeOpus41,
            ModelProvider::OpenAi | ModelProvider::AzureOpenAi => Model::Gpt4o,
        }
    }

    /// Environment variable holding the API key by default
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ModelProvider::Anthropic => "ANTHROPIC_API_KEY",
            ModelProvider::OpenAi => "OPENAI_API_KEY",
            ModelProvider::AzureOpenAi => "AZURE_OPENAI_API_KEY",
        }
    }

    /// Whether the provider needs a resource endpoint in addition to a key
    pub fn requires_endpoint(&self) -> bool {
        matches!(self, ModelProvider::AzureOpenAi)
    }
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ModelProvider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" => Ok(ModelProvider::Anthropic),
            "openai" => Ok(ModelProvider::OpenAi),
            "azure_openai" => Ok(ModelProvider::AzureOpenAi),
            _ => Err(DomainError::UnsupportedProvider {
                provider: s.to_string(),
                supported: Self::supported().join(", "),
            }),
        }
    }
}

impl Serialize for ModelProvider {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ModelProvider {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse_is_case_insensitive() {
        assert_eq!(
            "Anthropic".parse::<ModelProvider>().unwrap(),
            ModelProvider::Anthropic
        );
        assert_eq!(
            " OPENAI ".parse::<ModelProvider>().unwrap(),
            ModelProvider::OpenAi
        );
        assert_eq!(
            "azure_openai".parse::<ModelProvider>().unwrap(),
            ModelProvider::AzureOpenAi
        );
    }

    #[test]
    fn test_unknown_provider_lists_supported() {
        let err = "cohere".parse::<ModelProvider>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("cohere"));
        assert!(message.contains("anthropic, openai, azure_openai"));
    }

    #[test]
    fn test_default_models() {
        assert_eq!(
            ModelProvider::Anthropic.default_model().as_str(),
            "claude-opus-4-1-20250805"
        );
        assert_eq!(ModelProvider::OpenAi.default_model().as_str(), "gpt-4o");
        assert_eq!(ModelProvider::AzureOpenAi.default_model().as_str(), "gpt-4o");
    }

    #[test]
    fn test_only_azure_requires_endpoint() {
        assert!(ModelProvider::AzureOpenAi.requires_endpoint());
        assert!(!ModelProvider::OpenAi.requires_endpoint());
        assert!(!ModelProvider::Anthropic.requires_endpoint());
    }

    #[test]
    fn test_default_provider_is_anthropic() {
        assert_eq!(ModelProvider::default(), ModelProvider::Anthropic);
    }
}
