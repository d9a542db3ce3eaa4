//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod provider;
mod providers;
mod review;

pub use provider::FileProviderConfig;
pub use providers::{FileAnthropicConfig, FileAzureOpenAiConfig, FileOpenAiConfig};
pub use review::FileReviewConfig;

use secreview_application::ReviewConfig;
use secreview_domain::{
    ConfigIssue, ConfigIssueCode, IssueLevel, ModelProvider, validate_endpoint,
};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Provider selection and request limits
    pub provider: FileProviderConfig,
    /// Anthropic API settings
    pub anthropic: FileAnthropicConfig,
    /// OpenAI API settings
    pub openai: FileOpenAiConfig,
    /// Azure OpenAI resource settings
    pub azure_openai: FileAzureOpenAiConfig,
    /// Review behavior
    pub review: FileReviewConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks the provider name, the model override, Azure endpoint
    /// presence and shape, zero-valued limits and inline API keys.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let (provider, provider_issues) = self.provider.parse_provider();
        issues.extend(provider_issues);
        issues.extend(self.provider.parse_model().1);
        issues.extend(self.provider.numeric_issues());

        let uses_azure = provider == Some(ModelProvider::AzureOpenAi);
        match self.azure_openai.endpoint() {
            None if uses_azure => issues.push(ConfigIssue::error(
                ConfigIssueCode::MissingEndpoint,
                "azure_openai.endpoint: required for Azure OpenAI (set AZURE_OPENAI_ENDPOINT)",
            )),
            None => {}
            Some(endpoint) => {
                if let Err(e) = validate_endpoint(endpoint) {
                    let code = ConfigIssueCode::InvalidEndpoint {
                        value: endpoint.to_string(),
                    };
                    let message = format!("azure_openai.endpoint: {}", e);
                    issues.push(if uses_azure {
                        ConfigIssue::error(code, message)
                    } else {
                        ConfigIssue::warning(code, message)
                    });
                }
            }
        }

        issues.extend(providers::inline_key_issue("anthropic", &self.anthropic.api_key));
        issues.extend(providers::inline_key_issue("openai", &self.openai.api_key));
        issues.extend(providers::inline_key_issue(
            "azure_openai",
            &self.azure_openai.api_key,
        ));

        issues
    }

    /// Resolved settings as `(key, value)` pairs for `--show-config`.
    ///
    /// Credentials are never included; the key source is shown instead.
    pub fn effective_settings(&self) -> Vec<(&'static str, String)> {
        let provider = self.provider.parse_provider().0;
        let model = match (&self.provider.model, provider) {
            (Some(model), _) => model.clone(),
            (None, Some(p)) => format!("{} (default)", p.default_model()),
            (None, None) => "-".to_string(),
        };
        let key_env = match provider {
            Some(ModelProvider::Anthropic) => self.anthropic.api_key_env.clone(),
            Some(ModelProvider::OpenAi) => self.openai.api_key_env.clone(),
            Some(ModelProvider::AzureOpenAi) => self.azure_openai.api_key_env.clone(),
            None => "-".to_string(),
        };
        let timeout = match self.review.timeout_minutes {
            Some(0) => "disabled".to_string(),
            Some(minutes) => format!("{} min", minutes),
            None => format!("{} min (default)", ReviewConfig::DEFAULT_TIMEOUT_MINUTES),
        };

        vec![
            ("provider", self.provider.name.clone()),
            ("model", model),
            ("api_key_env", key_env),
            ("timeout", timeout),
            ("filter_findings", self.review.filter_findings.to_string()),
            ("mask_secrets", self.review.mask_secrets.to_string()),
            ("comment_pr", self.review.comment_pr.to_string()),
            ("run_every_commit", self.review.run_every_commit.to_string()),
            ("upload_results", self.review.upload_results.to_string()),
        ]
    }

    /// True when any issue is fatal
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.level == IssueLevel::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[provider]
name = "azure_openai"
model = "gpt-4o-prod"
timeout_seconds = 60
max_retries = 5

[azure_openai]
endpoint = "https://my-resource.openai.azure.com/"
api_version = "2024-10-21"

[review]
timeout_minutes = 30
filter_findings = false
custom_scan_instructions = "Also check self-hosted runners."
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.name, "azure_openai");
        assert_eq!(config.provider.model.as_deref(), Some("gpt-4o-prod"));
        assert_eq!(config.provider.timeout_seconds, 60);
        assert_eq!(config.provider.max_retries, 5);
        // Unset keys keep their defaults
        assert_eq!(config.provider.max_tokens, 16384);
        assert_eq!(config.azure_openai.api_version(), Some("2024-10-21"));
        assert_eq!(config.azure_openai.api_key_env, "AZURE_OPENAI_API_KEY");
        assert_eq!(config.review.timeout_minutes, Some(30));
        assert!(!config.review.filter_findings);
        assert!(config.review.mask_secrets);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_effective_settings_report_action_flags() {
        let toml_str = r#"
[provider]
name = "openai"

[review]
timeout_minutes = 0
comment_pr = false
run_every_commit = true
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let settings = config.effective_settings();
        let get = |key: &str| {
            settings
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
                .unwrap()
        };

        assert_eq!(get("provider"), "openai");
        assert_eq!(get("model"), "gpt-4o (default)");
        assert_eq!(get("api_key_env"), "OPENAI_API_KEY");
        assert_eq!(get("timeout"), "disabled");
        assert_eq!(get("comment_pr"), "false");
        assert_eq!(get("run_every_commit"), "true");
        assert_eq!(get("upload_results"), "true");
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.provider.name, "anthropic");
        assert!(config.provider.model.is_none());
        assert_eq!(config.provider.timeout_seconds, 180);
        assert_eq!(config.provider.max_retries, 3);
        assert_eq!(config.anthropic.base_url, "https://api.anthropic.com");
        assert_eq!(config.azure_openai.api_version(), None);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_azure_without_endpoint() {
        let config: FileConfig = toml::from_str("[provider]\nname = \"azure_openai\"\n").unwrap();
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::MissingEndpoint);
        assert!(FileConfig::has_errors(&issues));
    }

    #[test]
    fn test_validate_bad_endpoint_severity_depends_on_provider() {
        let mut config = FileConfig::default();
        config.azure_openai.endpoint = Some("my-resource.openai.azure.com".to_string());

        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].level, IssueLevel::Warning);

        config.provider.name = "azure_openai".to_string();
        let issues = config.validate();
        assert_eq!(issues[0].level, IssueLevel::Error);
        assert!(matches!(
            issues[0].code,
            ConfigIssueCode::InvalidEndpoint { .. }
        ));
    }

    #[test]
    fn test_validate_collects_all_issues() {
        let toml_str = r#"
[provider]
name = "bard"
model = ""
max_retries = 0
timeout_seconds = 0

[openai]
api_key = "sk-inline"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        let codes: Vec<_> = issues.iter().map(|i| &i.code).collect();

        assert!(matches!(codes[0], ConfigIssueCode::UnknownProvider { .. }));
        assert!(matches!(codes[1], ConfigIssueCode::EmptyModelName { .. }));
        assert_eq!(
            issues
                .iter()
                .filter(|i| matches!(i.code, ConfigIssueCode::ZeroValue { .. }))
                .count(),
            2
        );
        assert!(matches!(
            codes.last().unwrap(),
            ConfigIssueCode::InlineApiKey { .. }
        ));
    }
}
