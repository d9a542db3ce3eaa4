//! Anthropic Messages API client

use super::factory::FactoryError;
use super::http::{build_http_client, post_json, secret_header, versioned_url};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secreview_application::{AiModelClient, ClientError, Completion, CompletionRequest};
use secreview_domain::{ClientConfig, Model, ModelProvider, RetryPolicy};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const API_VERSION: &str = "2023-06-01";

/// Client for `POST /v1/messages`
pub struct AnthropicClient {
    http_client: reqwest::Client,
    headers: HeaderMap,
    model: Model,
    base_url: String,
    max_tokens: u32,
    retry_policy: RetryPolicy,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicClient {
    pub fn new(config: &ClientConfig) -> Result<Self, FactoryError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-api-key"),
            secret_header(config.api_key.expose())?,
        );
        headers.insert(
            HeaderName::from_static("anthropic-version"),
            HeaderValue::from_static(API_VERSION),
        );

        Ok(Self {
            http_client: build_http_client(config.timeout)?,
            headers,
            model: config.model.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_tokens: config.max_tokens,
            retry_policy: config.retry_policy(),
        })
    }

    fn messages_url(&self) -> String {
        versioned_url(&self.base_url, "messages")
    }
}

#[async_trait]
impl AiModelClient for AnthropicClient {
    fn provider(&self) -> ModelProvider {
        ModelProvider::Anthropic
    }

    fn model(&self) -> &Model {
        &self.model
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ClientError> {
        let body = MessagesRequest {
            model: self.model.as_str(),
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
            system: request.system_prompt.as_deref(),
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        };
        debug!(model = %self.model, max_tokens = body.max_tokens, "Sending Anthropic request");

        let raw = post_json(
            self.http_client
                .post(self.messages_url())
                .headers(self.headers.clone()),
            &body,
        )
        .await?;

        let response: MessagesResponse = serde_json::from_value(raw.clone())
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.trim().is_empty() {
            return Err(ClientError::InvalidResponse(
                "response contained no text content".into(),
            ));
        }

        Ok(Completion { text, raw })
    }
}
