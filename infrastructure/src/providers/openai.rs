//! OpenAI Chat Completions client
//!
//! The request and response types are shared with the Azure OpenAI client,
//! which speaks the same body format on a different URL.

use super::factory::FactoryError;
use super::http::{build_http_client, post_json, secret_header, versioned_url};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use secreview_application::{AiModelClient, ClientError, Completion, CompletionRequest};
use secreview_domain::{ClientConfig, Model, ModelProvider, RetryPolicy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Request body for the Chat Completions API
#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionsRequest<'a> {
    /// Omitted for Azure, where the deployment is in the URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    pub messages: Vec<ChatMessage<'a>>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl<'a> ChatCompletionsRequest<'a> {
    pub(crate) fn new(
        model: Option<&'a str>,
        request: &'a CompletionRequest,
        default_max_tokens: u32,
        temperature: f32,
    ) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system_prompt.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        Self {
            model,
            messages,
            max_tokens: request.max_tokens.unwrap_or(default_max_tokens),
            temperature,
        }
    }
}

/// `choices[0].message.content`, which must be non-empty.
pub(crate) fn completion_from_chat(raw: Value) -> Result<Completion, ClientError> {
    let response: ChatCompletionsResponse = serde_json::from_value(raw.clone())
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ClientError::InvalidResponse("response contained no message content".into()))?;

    Ok(Completion { text, raw })
}

/// Client for `POST /v1/chat/completions`
pub struct OpenAiClient {
    http_client: reqwest::Client,
    headers: HeaderMap,
    model: Model,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
    retry_policy: RetryPolicy,
}

impl OpenAiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, FactoryError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            secret_header(&format!("Bearer {}", config.api_key.expose()))?,
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
            temperature: config.temperature,
            retry_policy: config.retry_policy(),
        })
    }

    fn chat_completions_url(&self) -> String {
        versioned_url(&self.base_url, "chat/completions")
    }
}

#[async_trait]
impl AiModelClient for OpenAiClient {
    fn provider(&self) -> ModelProvider {
        ModelProvider::OpenAi
    }

    fn model(&self) -> &Model {
        &self.model
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ClientError> {
        let body = ChatCompletionsRequest::new(
            Some(self.model.as_str()),
            request,
            self.max_tokens,
            self.temperature,
        );
        debug!(model = %self.model, max_tokens = body.max_tokens, "Sending OpenAI request");

        let raw = post_json(
            self.http_client
                .post(self.chat_completions_url())
                .headers(self.headers.clone()),
            &body,
        )
        .await?;
        completion_from_chat(raw)
    }
}
