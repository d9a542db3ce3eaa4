//! Azure OpenAI client
//!
//! Same body as OpenAI chat completions, addressed to a deployment:
//! `{endpoint}/openai/deployments/{model}/chat/completions?api-version={v}`.
//! The configured model name is the deployment name.

use super::factory::FactoryError;
use super::http::{build_http_client, post_json, secret_header};
use super::openai::{ChatCompletionsRequest, completion_from_chat};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName};
use secreview_application::{AiModelClient, ClientError, Completion, CompletionRequest};
use secreview_domain::{AzureSettings, ClientConfig, Model, ModelProvider, RetryPolicy};
use tracing::debug;

pub struct AzureOpenAiClient {
    http_client: reqwest::Client,
    headers: HeaderMap,
    model: Model,
    azure: AzureSettings,
    max_tokens: u32,
    temperature: f32,
    retry_policy: RetryPolicy,
}

impl AzureOpenAiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, FactoryError> {
        let azure = config.azure.clone().ok_or(FactoryError::MissingEndpoint)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("api-key"),
            secret_header(config.api_key.expose())?,
        );

        Ok(Self {
            http_client: build_http_client(config.timeout)?,
            headers,
            model: config.model.clone(),
            azure,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            retry_policy: config.retry_policy(),
        })
    }

    fn deployment_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.azure.normalized_endpoint(),
            self.model.as_str()
        )
    }
}

#[async_trait]
impl AiModelClient for AzureOpenAiClient {
    fn provider(&self) -> ModelProvider {
        ModelProvider::AzureOpenAi
    }

    fn model(&self) -> &Model {
        &self.model
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ClientError> {
        let body = ChatCompletionsRequest::new(None, request, self.max_tokens, self.temperature);
        debug!(
            deployment = %self.model,
            api_version = %self.azure.api_version,
            max_tokens = body.max_tokens,
            "Sending Azure OpenAI request"
        );

        let raw = post_json(
            self.http_client
                .post(self.deployment_url())
                .query(&[("api-version", self.azure.api_version.as_str())])
                .headers(self.headers.clone()),
            &body,
        )
        .await?;
        completion_from_chat(raw)
    }
}
