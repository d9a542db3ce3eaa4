//! Model factory: provider identifier to [`AiModelClient`]
//!
//! Resolves model, API key and Azure settings from configuration and the
//! environment, then hands a [`ClientConfig`] to the constructor registered
//! for the provider.

use super::anthropic::AnthropicClient;
use super::azure_openai::AzureOpenAiClient;
use super::openai::OpenAiClient;
use crate::config::FileConfig;
use secreview_application::AiModelClient;
use secreview_domain::{ApiKey, AzureSettings, ClientConfig, DomainError, Model, ModelProvider};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Errors that can occur while creating a client
#[derive(Error, Debug)]
pub enum FactoryError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("AZURE_OPENAI_ENDPOINT environment variable is required for Azure OpenAI")]
    MissingEndpoint,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("No client implementation for provider: {0}")]
    Unregistered(ModelProvider),
}

/// Builds a client from a resolved configuration
pub type ClientConstructor =
    Arc<dyn Fn(&ClientConfig) -> Result<Arc<dyn AiModelClient>, FactoryError> + Send + Sync>;

/// Environment lookup, replaceable in tests
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Factory for creating AI model clients.
///
/// Each `create_client` call builds a fresh client; the factory keeps only
/// settings and constructors.
pub struct ModelFactory {
    config: FileConfig,
    constructors: HashMap<ModelProvider, ClientConstructor>,
    env: EnvLookup,
}

impl ModelFactory {
    /// Factory with built-in defaults and the three standard providers
    pub fn new() -> Self {
        Self::from_config(&FileConfig::default())
    }

    /// Factory using loaded configuration for limits, key sources and endpoints
    pub fn from_config(config: &FileConfig) -> Self {
        let mut constructors: HashMap<ModelProvider, ClientConstructor> = HashMap::new();
        constructors.insert(
            ModelProvider::Anthropic,
            Arc::new(|c| Ok(Arc::new(AnthropicClient::new(c)?) as Arc<dyn AiModelClient>)),
        );
        constructors.insert(
            ModelProvider::OpenAi,
            Arc::new(|c| Ok(Arc::new(OpenAiClient::new(c)?) as Arc<dyn AiModelClient>)),
        );
        constructors.insert(
            ModelProvider::AzureOpenAi,
            Arc::new(|c| Ok(Arc::new(AzureOpenAiClient::new(c)?) as Arc<dyn AiModelClient>)),
        );

        Self {
            config: config.clone(),
            constructors,
            env: Arc::new(|name| std::env::var(name).ok()),
        }
    }

    pub fn with_env_lookup(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    /// Replace (or add) the constructor for a provider.
    pub fn register_provider<F>(&mut self, provider: ModelProvider, constructor: F)
    where
        F: Fn(&ClientConfig) -> Result<Arc<dyn AiModelClient>, FactoryError>
            + Send
            + Sync
            + 'static,
    {
        self.constructors.insert(provider, Arc::new(constructor));
        info!("Registered provider: {}", provider);
    }

    /// Provider identifiers that have a constructor, in display order
    pub fn supported_providers(&self) -> Vec<&'static str> {
        ModelProvider::ALL
            .iter()
            .filter(|p| self.constructors.contains_key(p))
            .map(|p| p.as_str())
            .collect()
    }

    /// Client for the provider and model named in the configuration.
    pub fn create_configured_client(&self) -> Result<Arc<dyn AiModelClient>, FactoryError> {
        self.create_client(&self.config.provider.name, None, None)
    }

    /// Create a client.
    ///
    /// `model` falls back to the configured model (when `provider` is the
    /// configured provider) and then to the provider default. `api_key`
    /// falls back to the config file and then to the provider's environment
    /// variable.
    pub fn create_client(
        &self,
        provider: &str,
        model: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<Arc<dyn AiModelClient>, FactoryError> {
        let provider: ModelProvider = provider.parse()?;
        let client_config = self.resolve(provider, model, api_key)?;

        let constructor = self
            .constructors
            .get(&provider)
            .ok_or(FactoryError::Unregistered(provider))?;
        let client = constructor(&client_config)?;

        info!(
            "Created {} client with model: {}",
            provider, client_config.model
        );
        Ok(client)
    }

    /// Resolve the full client configuration for a provider.
    pub fn resolve(
        &self,
        provider: ModelProvider,
        model: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<ClientConfig, FactoryError> {
        let model = self.resolve_model(provider, model);
        let api_key = self.resolve_api_key(provider, api_key)?;

        let limits = &self.config.provider;
        let mut client_config = ClientConfig::new(provider, api_key)
            .with_model(model)
            .with_timeout(Duration::from_secs(limits.timeout_seconds))
            .with_max_retries(limits.max_retries)
            .with_max_tokens(limits.max_tokens);

        match provider {
            ModelProvider::Anthropic => {
                client_config = client_config.with_base_url(&self.config.anthropic.base_url);
            }
            ModelProvider::OpenAi => {
                client_config = client_config.with_base_url(&self.config.openai.base_url);
            }
            ModelProvider::AzureOpenAi => {
                client_config = client_config.with_azure(self.resolve_azure()?);
            }
        }

        Ok(client_config)
    }

    fn resolve_model(&self, provider: ModelProvider, model: Option<&str>) -> Model {
        let configured_provider = self.config.provider.name.parse::<ModelProvider>().ok();
        let configured_model = self
            .config
            .provider
            .model
            .as_deref()
            .filter(|_| configured_provider == Some(provider));

        model
            .or(configured_model)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(Model::from)
            .unwrap_or_else(|| provider.default_model())
    }

    fn resolve_api_key(
        &self,
        provider: ModelProvider,
        api_key: Option<&str>,
    ) -> Result<ApiKey, FactoryError> {
        let (inline, env_name) = match provider {
            ModelProvider::Anthropic => (
                &self.config.anthropic.api_key,
                &self.config.anthropic.api_key_env,
            ),
            ModelProvider::OpenAi => (&self.config.openai.api_key, &self.config.openai.api_key_env),
            ModelProvider::AzureOpenAi => (
                &self.config.azure_openai.api_key,
                &self.config.azure_openai.api_key_env,
            ),
        };

        let non_blank = |key: &String| !key.trim().is_empty();
        api_key
            .map(str::to_string)
            .filter(non_blank)
            .or_else(|| inline.clone().filter(non_blank))
            .or_else(|| (self.env)(env_name).filter(non_blank))
            .map(ApiKey::new)
            .ok_or_else(|| DomainError::MissingCredential(env_name.clone()).into())
    }

    fn resolve_azure(&self) -> Result<AzureSettings, FactoryError> {
        let section = &self.config.azure_openai;
        let endpoint = section
            .endpoint()
            .map(str::to_string)
            .or_else(|| (self.env)("AZURE_OPENAI_ENDPOINT"))
            .filter(|e| !e.trim().is_empty())
            .ok_or(FactoryError::MissingEndpoint)?;
        let api_version = section
            .api_version()
            .map(str::to_string)
            .or_else(|| (self.env)("AZURE_OPENAI_API_VERSION"));

        Ok(AzureSettings::new(endpoint, api_version)?)
    }
}

impl Default for ModelFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use secreview_application::{ClientError, Completion, CompletionRequest};
    use secreview_domain::RetryPolicy;

    fn env_with(vars: &[(&str, &str)]) -> EnvLookup {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(move |name| vars.get(name).cloned())
    }

    fn factory(vars: &[(&str, &str)]) -> ModelFactory {
        ModelFactory::new().with_env_lookup(env_with(vars))
    }

    struct StubClient {
        model: Model,
    }

    #[async_trait]
    impl AiModelClient for StubClient {
        fn provider(&self) -> ModelProvider {
            ModelProvider::OpenAi
        }
        fn model(&self) -> &Model {
            &self.model
        }
        fn retry_policy(&self) -> RetryPolicy {
            RetryPolicy::immediate(1)
        }
        async fn complete(&self, _request: &CompletionRequest) -> Result<Completion, ClientError> {
            Ok(Completion {
                text: "stub".into(),
                raw: serde_json::Value::Null,
            })
        }
    }

    #[test]
    fn test_unsupported_provider_lists_supported() {
        let err = factory(&[])
            .create_client("gemini", None, None)
            .err()
            .expect("expected an error");
        assert_eq!(
            err.to_string(),
            "Unsupported provider 'gemini'. Supported providers: anthropic, openai, azure_openai"
        );
    }

    #[test]
    fn test_default_model_and_env_key() {
        let client = factory(&[("OPENAI_API_KEY", "sk-env")])
            .create_client("OpenAI", None, None)
            .unwrap();
        assert_eq!(client.provider(), ModelProvider::OpenAi);
        assert_eq!(client.model().as_str(), "gpt-4o");
    }

    #[test]
    fn test_missing_key_names_variable() {
        let err = factory(&[])
            .create_client("anthropic", None, None)
            .err()
            .expect("expected an error");
        assert_eq!(
            err.to_string(),
            "API key not found. Please set ANTHROPIC_API_KEY environment variable"
        );
    }

    #[test]
    fn test_explicit_key_wins() {
        let config = factory(&[("OPENAI_API_KEY", "sk-env")])
            .resolve(ModelProvider::OpenAi, Some("gpt-4.1"), Some("sk-arg"))
            .unwrap();
        assert_eq!(config.api_key.expose(), "sk-arg");
        assert_eq!(config.model, Model::Gpt41);
    }

    #[test]
    fn test_azure_requires_endpoint() {
        let err = factory(&[("AZURE_OPENAI_API_KEY", "k")])
            .create_client("azure_openai", None, None)
            .err()
            .expect("expected an error");
        assert!(matches!(err, FactoryError::MissingEndpoint));
        assert!(err.to_string().contains("AZURE_OPENAI_ENDPOINT"));
    }

    #[test]
    fn test_azure_requires_key() {
        let err = factory(&[("AZURE_OPENAI_ENDPOINT", "https://res.openai.azure.com/")])
            .create_client("azure_openai", None, None)
            .err()
            .expect("expected an error");
        assert!(err.to_string().contains("AZURE_OPENAI_API_KEY"));
    }

    #[test]
    fn test_azure_from_env() {
        let config = factory(&[
            ("AZURE_OPENAI_API_KEY", "k"),
            ("AZURE_OPENAI_ENDPOINT", "https://res.openai.azure.com/"),
        ])
        .resolve(ModelProvider::AzureOpenAi, Some("my-deployment"), None)
        .unwrap();
        let azure = config.azure.unwrap();
        assert_eq!(azure.normalized_endpoint(), "https://res.openai.azure.com");
        assert_eq!(azure.api_version, "2025-01-01-preview");
        assert_eq!(config.model.as_str(), "my-deployment");
    }

    #[test]
    fn test_azure_invalid_endpoint() {
        let err = factory(&[
            ("AZURE_OPENAI_API_KEY", "k"),
            ("AZURE_OPENAI_ENDPOINT", "res.openai.azure.com"),
        ])
        .create_client("azure_openai", None, None)
        .err()
        .expect("expected an error");
        assert!(matches!(
            err,
            FactoryError::Domain(DomainError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_config_limits_and_model_apply() {
        let mut file = FileConfig::default();
        file.provider.name = "openai".to_string();
        file.provider.model = Some("gpt-4o-mini".to_string());
        file.provider.max_retries = 5;
        file.provider.timeout_seconds = 30;
        file.openai.api_key_env = "CUSTOM_OPENAI_KEY".to_string();

        let factory = ModelFactory::from_config(&file)
            .with_env_lookup(env_with(&[("CUSTOM_OPENAI_KEY", "sk-custom")]));
        let config = factory.resolve(ModelProvider::OpenAi, None, None).unwrap();
        assert_eq!(config.model, Model::Gpt4oMini);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.timeout, Duration::from_secs(30));

        // The configured model only applies to the configured provider
        let other = factory
            .resolve(ModelProvider::Anthropic, None, Some("key"))
            .unwrap();
        assert_eq!(other.model, Model::ClaudeOpus41);
    }

    #[test]
    fn test_register_provider_replaces_constructor() {
        let mut factory = factory(&[("OPENAI_API_KEY", "sk")]);
        factory.register_provider(ModelProvider::OpenAi, |config| {
            Ok(Arc::new(StubClient {
                model: config.model.clone(),
            }) as Arc<dyn AiModelClient>)
        });

        let client = factory
            .create_client("openai", Some("local"), None)
            .unwrap();
        assert_eq!(client.model().as_str(), "local");
        assert_eq!(
            factory.supported_providers(),
            vec!["anthropic", "openai", "azure_openai"]
        );
    }
}
