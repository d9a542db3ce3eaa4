//! Provider selection from TOML (`[provider]` section)

use secreview_domain::{
    ClientConfig, ConfigIssue, ConfigIssueCode, Model, ModelProvider,
};
use serde::{Deserialize, Serialize};

/// Which provider and model to call, and how patiently.
///
/// # Example
///
/// ```toml
/// [provider]
/// name = "azure_openai"   # AI_PROVIDER
/// model = "gpt-4o"        # AI_MODEL (Azure: the deployment name)
/// timeout_seconds = 180   # AI_TIMEOUT_SECONDS
/// max_retries = 3         # AI_MAX_RETRIES
/// max_tokens = 16384      # AI_MAX_TOKENS
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    pub name: String,
    /// Defaults per provider when unset
    pub model: Option<String>,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub max_tokens: u32,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            name: ModelProvider::default().as_str().to_string(),
            model: None,
            timeout_seconds: ClientConfig::DEFAULT_TIMEOUT_SECONDS,
            max_retries: ClientConfig::DEFAULT_MAX_RETRIES,
            max_tokens: ClientConfig::DEFAULT_MAX_TOKENS,
        }
    }
}

impl FileProviderConfig {
    /// Parse the provider name, collecting an issue when it is unknown.
    pub fn parse_provider(&self) -> (Option<ModelProvider>, Vec<ConfigIssue>) {
        match self.name.parse::<ModelProvider>() {
            Ok(provider) => (Some(provider), Vec::new()),
            Err(e) => (
                None,
                vec![ConfigIssue::error(
                    ConfigIssueCode::UnknownProvider {
                        value: self.name.clone(),
                    },
                    format!("provider.name: {}", e),
                )],
            ),
        }
    }

    /// Parse the model override, collecting an issue for a blank name.
    pub fn parse_model(&self) -> (Option<Model>, Vec<ConfigIssue>) {
        match self.model.as_deref() {
            None => (None, Vec::new()),
            Some(s) if s.trim().is_empty() => (
                None,
                vec![ConfigIssue::error(
                    ConfigIssueCode::EmptyModelName {
                        field: "provider.model".to_string(),
                    },
                    "provider.model: model name cannot be empty",
                )],
            ),
            Some(s) => (Some(Model::from(s.trim())), Vec::new()),
        }
    }

    pub(super) fn numeric_issues(&self) -> Vec<ConfigIssue> {
        [
            ("provider.timeout_seconds", self.timeout_seconds == 0),
            ("provider.max_retries", self.max_retries == 0),
            ("provider.max_tokens", self.max_tokens == 0),
        ]
        .into_iter()
        .filter(|(_, is_zero)| *is_zero)
        .map(|(field, _)| {
            ConfigIssue::error(
                ConfigIssueCode::ZeroValue {
                    field: field.to_string(),
                },
                format!("{}: must be greater than zero", field),
            )
        })
        .collect()
    }
}
