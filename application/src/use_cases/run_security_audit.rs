//! Run Security Audit use case
//!
//! Sends an audit prompt to the configured provider and turns the reply into
//! a [`SecurityReport`].

use crate::config::ReviewConfig;
use crate::ports::audit_log::{AuditEvent, AuditLogger, NoAuditLog};
use crate::ports::model_client::{AiModelClient, ClientError, CompletionRequest};
use crate::ports::progress::{NoProgress, ReviewProgressNotifier, ReviewStage};
use secreview_domain::{SecurityReport, parse_json_with_fallbacks};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during an audit
#[derive(Error, Debug)]
pub enum RunAuditError {
    #[error("Repository directory does not exist: {}", .0.display())]
    RepositoryNotFound(PathBuf),

    #[error("Audit prompt is empty")]
    EmptyPrompt,

    #[error("AI security analysis failed: {0}")]
    Client(#[from] ClientError),

    #[error("Failed to parse AI response as JSON")]
    UnparseableResponse,

    #[error("AI security analysis timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("AI client validation failed: {0}")]
    Validation(ClientError),
}

/// Use case for running one security audit
pub struct RunSecurityAuditUseCase {
    client: Arc<dyn AiModelClient>,
    config: ReviewConfig,
    audit_log: Arc<dyn AuditLogger>,
}

impl RunSecurityAuditUseCase {
    pub fn new(client: Arc<dyn AiModelClient>) -> Self {
        Self {
            client,
            config: ReviewConfig::default(),
            audit_log: Arc::new(NoAuditLog),
        }
    }

    pub fn with_config(mut self, config: ReviewConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_audit_logger(mut self, audit_log: Arc<dyn AuditLogger>) -> Self {
        self.audit_log = audit_log;
        self
    }

    /// Check that the AI client can be reached with the configured credentials.
    pub async fn validate_ai_available(&self) -> Result<(), RunAuditError> {
        self.client
            .validate_api_access()
            .await
            .map_err(RunAuditError::Validation)
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        repo_dir: &Path,
        prompt: &str,
    ) -> Result<SecurityReport, RunAuditError> {
        self.execute_with_progress(repo_dir, prompt, &NoProgress)
            .await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        repo_dir: &Path,
        prompt: &str,
        progress: &dyn ReviewProgressNotifier,
    ) -> Result<SecurityReport, RunAuditError> {
        if !repo_dir.exists() {
            return Err(RunAuditError::RepositoryNotFound(repo_dir.to_path_buf()));
        }
        if prompt.trim().is_empty() {
            return Err(RunAuditError::EmptyPrompt);
        }

        let prompt_size = prompt.len();
        if prompt_size > self.config.large_prompt_bytes {
            warn!(
                "Large prompt size: {:.2}MB",
                prompt_size as f64 / 1024.0 / 1024.0
            );
        }

        progress.on_stage_start(ReviewStage::Audit, self.config.audit_attempts as usize);

        let result = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, self.run_attempts(prompt, progress))
                .await
                .unwrap_or(Err(RunAuditError::TimedOut(limit))),
            None => self.run_attempts(prompt, progress).await,
        };

        progress.on_stage_complete(ReviewStage::Audit);
        result
    }

    /// Outer attempts: a failed call or unparseable reply is retried after a
    /// short pause until the attempts run out.
    async fn run_attempts(
        &self,
        prompt: &str,
        progress: &dyn ReviewProgressNotifier,
    ) -> Result<SecurityReport, RunAuditError> {
        let provider = self.client.provider();
        let max_attempts = self.config.audit_attempts.max(1);

        let mut attempt = 0;

        loop {
            progress.on_attempt(attempt + 1, max_attempts);
            info!(
                provider = %provider,
                model = %self.client.model(),
                "Running security analysis attempt {}/{}",
                attempt + 1,
                max_attempts
            );
            debug!(prompt_chars = prompt.len(), "Prompt prepared");

            let request =
                CompletionRequest::new(prompt).with_max_tokens(self.config.audit_max_tokens);
            self.audit_log.log(AuditEvent::new(
                "api_request",
                json!({
                    "provider": provider.as_str(),
                    "model": self.client.model().as_str(),
                    "attempt": attempt + 1,
                    "prompt_chars": prompt.len(),
                }),
            ));

            let started = Instant::now();
            let last_attempt = attempt + 1 == max_attempts;

            let error = match self.client.call_with_retry(request).await {
                Ok(completion) => {
                    let elapsed = started.elapsed();
                    info!(
                        response_chars = completion.text.len(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "AI security analysis successful"
                    );
                    self.audit_log.log(AuditEvent::new(
                        "api_response",
                        json!({
                            "provider": provider.as_str(),
                            "attempt": attempt + 1,
                            "response_chars": completion.text.len(),
                            "duration_ms": elapsed.as_millis() as u64,
                        }),
                    ));

                    match parse_json_with_fallbacks(&completion.text) {
                        Some(value) => {
                            progress.on_item_complete(ReviewStage::Audit, "analysis", true);
                            let decoded = SecurityReport::decode_model_output(&value);
                            for rejected in &decoded.rejected {
                                warn!(
                                    index = rejected.index,
                                    reason = %rejected.reason,
                                    raw = %rejected.raw,
                                    "Dropping unreadable finding from model reply"
                                );
                            }
                            if !decoded.rejected.is_empty() {
                                self.audit_log.log(AuditEvent::new(
                                    "finding_rejected",
                                    json!({
                                        "count": decoded.rejected.len(),
                                        "reasons": decoded
                                            .rejected
                                            .iter()
                                            .map(|r| r.reason.as_str())
                                            .collect::<Vec<_>>(),
                                    }),
                                ));
                            }
                            let report = decoded.report;
                            info!(findings = report.findings.len(), "Parsed security findings");
                            return Ok(report);
                        }
                        None => {
                            self.audit_log.log(AuditEvent::new(
                                "parse_failure",
                                json!({
                                    "attempt": attempt + 1,
                                    "preview": completion.text.chars().take(300).collect::<String>(),
                                }),
                            ));
                            RunAuditError::UnparseableResponse
                        }
                    }
                }
                Err(e) => {
                    self.audit_log.log(AuditEvent::new(
                        "api_error",
                        json!({
                            "provider": provider.as_str(),
                            "attempt": attempt + 1,
                            "error": e.to_string(),
                        }),
                    ));
                    RunAuditError::Client(e)
                }
            };

            progress.on_item_complete(ReviewStage::Audit, "analysis", false);
            if last_attempt {
                return Err(error);
            }
            warn!("{}, retrying...", error);
            tokio::time::sleep(self.config.attempt_delay).await;
            attempt += 1;
        }
    }
}
