//! Test doubles shared by the use case tests.

use crate::ports::model_client::{AiModelClient, ClientError, Completion, CompletionRequest};
use crate::ports::secret_scanner::{ScanError, SecretScanner};
use async_trait::async_trait;
use secreview_domain::{DetectedSecret, Model, ModelProvider, RetryPolicy};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Client that answers from a script, or with a function of the prompt.
pub struct FakeClient {
    model: Model,
    replies: Mutex<VecDeque<Result<String, ClientError>>>,
    responder: Option<Box<dyn Fn(&CompletionRequest) -> Result<String, ClientError> + Send + Sync>>,
    latency: Option<Duration>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeClient {
    pub fn scripted(replies: Vec<Result<String, ClientError>>) -> Self {
        Self {
            model: Model::Gpt4o,
            replies: Mutex::new(replies.into()),
            responder: None,
            latency: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, ClientError> + Send + Sync + 'static,
    {
        Self {
            model: Model::Gpt4o,
            replies: Mutex::new(VecDeque::new()),
            responder: Some(Box::new(responder)),
            latency: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every completion takes this long (virtual time under `start_paused`).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl AiModelClient for FakeClient {
    fn provider(&self) -> ModelProvider {
        ModelProvider::OpenAi
    }

    fn model(&self) -> &Model {
        &self.model
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::immediate(1)
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let text = match &self.responder {
            Some(responder) => responder(request),
            None => self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ClientError::InvalidResponse("script exhausted".into()))),
        }?;
        Ok(Completion {
            text,
            raw: serde_json::Value::Null,
        })
    }
}

/// Scanner with a fixed answer.
pub struct FakeScanner {
    pub available: bool,
    pub result: Mutex<Option<Result<Vec<DetectedSecret>, ScanError>>>,
}

impl FakeScanner {
    pub fn finding(secrets: Vec<DetectedSecret>) -> Self {
        Self {
            available: true,
            result: Mutex::new(Some(Ok(secrets))),
        }
    }

    pub fn failing(error: ScanError) -> Self {
        Self {
            available: true,
            result: Mutex::new(Some(Err(error))),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            result: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SecretScanner for FakeScanner {
    fn name(&self) -> &str {
        "fake"
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn scan(&self, _content: &str) -> Result<Vec<DetectedSecret>, ScanError> {
        self.result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub fn secret(rule: &str, value: &str) -> DetectedSecret {
    DetectedSecret {
        rule: rule.to_string(),
        secret: value.to_string(),
        file: None,
        line: None,
    }
}
