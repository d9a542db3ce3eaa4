//! AI model client port
//!
//! Defines the interface for calling one provider's completion API.
//! Implementations (adapters) live in the infrastructure layer; retries are
//! shared here so every provider backs off the same way.

use async_trait::async_trait;
use secreview_domain::{Model, ModelProvider, PromptTemplate, RetryPolicy};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while calling a provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Rate limited by provider")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{provider} API call failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        provider: String,
        attempts: u32,
        last: Box<ClientError>,
    },
}

impl ClientError {
    /// Transient failures worth another attempt.
    ///
    /// Client-side mistakes (bad request, auth, unknown deployment) and
    /// undecodable bodies fail immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Connection(_) | ClientError::Timeout | ClientError::RateLimited { .. } => {
                true
            }
            ClientError::Api { status, .. } => matches!(status, 408 | 409 | 429 | 500..=599),
            ClientError::Authentication(_)
            | ClientError::InvalidResponse(_)
            | ClientError::RetriesExhausted { .. } => false,
        }
    }

    /// Provider-supplied wait hint
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ClientError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Operator-facing troubleshooting hint, when one applies
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ClientError::Authentication(_) => {
                Some("check that the API key is valid and has permission to use this model")
            }
            ClientError::Api { status: 404, .. } => Some(
                "check that the model (or Azure deployment name) matches `ai-model` and is deployed",
            ),
            ClientError::Connection(_) => Some(
                "check the endpoint URL; Azure endpoints must be the full resource URL, e.g. https://<resource>.openai.azure.com/",
            ),
            ClientError::RetriesExhausted { last, .. } => last.hint(),
            _ => None,
        }
    }
}

/// A single completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    /// Falls back to the client's configured limit when `None`
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Successful completion
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Assistant text
    pub text: String,
    /// Raw provider response body
    pub raw: serde_json::Value,
}

/// Client for one AI provider's completion API
#[async_trait]
pub trait AiModelClient: Send + Sync {
    /// Provider this client talks to
    fn provider(&self) -> ModelProvider;

    /// Model (or deployment) requests are sent to
    fn model(&self) -> &Model;

    /// Attempts and backoff for `call_with_retry`
    fn retry_policy(&self) -> RetryPolicy;

    /// Make exactly one API call
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ClientError>;

    /// Check that credentials, endpoint and model work.
    ///
    /// Sends a tiny completion; any failure means access is not working.
    async fn validate_api_access(&self) -> Result<(), ClientError> {
        let request =
            CompletionRequest::new(PromptTemplate::access_check_prompt()).with_max_tokens(10);
        self.complete(&request).await.map(|_| ())
    }

    /// Make an API call, retrying transient failures with exponential backoff.
    async fn call_with_retry(&self, request: CompletionRequest) -> Result<Completion, ClientError> {
        let policy = self.retry_policy();
        let mut attempt = 0;

        loop {
            match self.complete(&request).await {
                Ok(completion) => {
                    debug!(
                        provider = %self.provider(),
                        attempt = attempt + 1,
                        chars = completion.text.len(),
                        "Completion received"
                    );
                    return Ok(completion);
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) if policy.has_attempts_left(attempt) => {
                    let delay = policy.delay_after(attempt, e.retry_after());
                    warn!(
                        provider = %self.provider(),
                        attempt = attempt + 1,
                        max_attempts = policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Provider call failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(ClientError::RetriesExhausted {
                        provider: self.provider().display_name().to_string(),
                        attempts: attempt + 1,
                        last: Box::new(e),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    // -- Scripted client ------------------------------------------------------

    struct ScriptedClient {
        model: Model,
        policy: RetryPolicy,
        replies: Mutex<VecDeque<Result<Completion, ClientError>>>,
        calls: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedClient {
        fn new(max_attempts: u32, replies: Vec<Result<Completion, ClientError>>) -> Self {
            Self {
                model: Model::Gpt4o,
                policy: RetryPolicy::immediate(max_attempts),
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AiModelClient for ScriptedClient {
        fn provider(&self) -> ModelProvider {
            ModelProvider::OpenAi
        }

        fn model(&self) -> &Model {
            &self.model
        }

        fn retry_policy(&self) -> RetryPolicy {
            self.policy
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ClientError> {
            self.calls.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ClientError::InvalidResponse("script exhausted".into())))
        }
    }

    fn ok(text: &str) -> Result<Completion, ClientError> {
        Ok(Completion {
            text: text.to_string(),
            raw: serde_json::Value::Null,
        })
    }

    // -- Retry behaviour ------------------------------------------------------

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let client = ScriptedClient::new(
            3,
            vec![
                Err(ClientError::Timeout),
                Err(ClientError::Api {
                    status: 503,
                    message: "overloaded".into(),
                }),
                ok("done"),
            ],
        );

        let completion = client
            .call_with_retry(CompletionRequest::new("hi"))
            .await
            .unwrap();
        assert_eq!(completion.text, "done");
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn fatal_errors_are_not_retried() {
        let client = ScriptedClient::new(
            3,
            vec![Err(ClientError::Authentication("bad key".into())), ok("unused")],
        );

        let err = client
            .call_with_retry(CompletionRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Authentication(_)));
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn exhausting_attempts_reports_last_error() {
        let client = ScriptedClient::new(
            2,
            vec![
                Err(ClientError::Connection("refused".into())),
                Err(ClientError::RateLimited { retry_after: None }),
            ],
        );

        let err = client
            .call_with_retry(CompletionRequest::new("hi"))
            .await
            .unwrap_err();
        match err {
            ClientError::RetriesExhausted {
                provider,
                attempts,
                last,
            } => {
                assert_eq!(provider, "OpenAI");
                assert_eq!(attempts, 2);
                assert!(matches!(*last, ClientError::RateLimited { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn validate_api_access_sends_small_request() {
        let client = ScriptedClient::new(1, vec![ok("Hi!")]);
        client.validate_api_access().await.unwrap();

        let calls = client.calls.lock().unwrap();
        assert_eq!(calls[0].prompt, "Hello");
        assert_eq!(calls[0].max_tokens, Some(10));
        assert!(calls[0].system_prompt.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_waits_between_attempts() {
        let mut client = ScriptedClient::new(3, vec![Err(ClientError::Timeout), ok("late")]);
        client.policy = RetryPolicy::new(3);

        let start = tokio::time::Instant::now();
        client
            .call_with_retry(CompletionRequest::new("hi"))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    // -- Classification -------------------------------------------------------

    #[test]
    fn retryable_classification() {
        assert!(ClientError::Timeout.is_retryable());
        let api = |status| ClientError::Api {
            status,
            message: String::new(),
        };
        assert!(api(500).is_retryable());
        assert!(api(429).is_retryable());
        assert!(!api(400).is_retryable());
        assert!(!api(404).is_retryable());
        assert!(!ClientError::InvalidResponse("x".into()).is_retryable());
    }

    #[test]
    fn hints_follow_troubleshooting_guide() {
        let not_deployed = ClientError::Api {
            status: 404,
            message: "DeploymentNotFound".into(),
        };
        assert!(not_deployed.hint().unwrap().contains("deployment"));

        let wrapped = ClientError::RetriesExhausted {
            provider: "Azure OpenAI".into(),
            attempts: 3,
            last: Box::new(ClientError::Connection("dns".into())),
        };
        assert!(wrapped.hint().unwrap().contains("endpoint"));
        assert!(ClientError::Timeout.hint().is_none());
    }
}
