//! Filter Findings use case
//!
//! Second pass over an audit report: each finding is sent back to the model,
//! which judges whether it is a false positive.

use crate::config::ReviewConfig;
use crate::ports::audit_log::{AuditEvent, AuditLogger, NoAuditLog};
use crate::ports::model_client::{AiModelClient, ClientError, CompletionRequest};
use crate::ports::progress::{NoProgress, ReviewProgressNotifier, ReviewStage};
use futures::stream::{self, StreamExt};
use secreview_domain::{
    Finding, FindingVerdict, PrContext, PromptTemplate, SecurityReport, parse_json_with_fallbacks,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from analysing one finding
#[derive(Error, Debug)]
pub enum AnalyzeFindingError {
    #[error("Finding analysis failed: {0}")]
    Client(#[from] ClientError),

    #[error("Failed to parse finding analysis as JSON")]
    UnparseableResponse,

    #[error("Finding analysis JSON is missing required fields")]
    InvalidVerdict,
}

/// A finding removed as a false positive, with the model's reasoning
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedFinding {
    pub finding: Finding,
    pub verdict: FindingVerdict,
}

/// Result of filtering a report
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    /// Report with false positives dropped and counters recomputed
    pub report: SecurityReport,
    pub removed: Vec<RemovedFinding>,
    /// Findings kept unchanged because their analysis failed
    pub analysis_failures: usize,
}

/// Use case for false-positive filtering
pub struct FilterFindingsUseCase {
    client: Arc<dyn AiModelClient>,
    config: ReviewConfig,
    custom_instructions: Option<String>,
    audit_log: Arc<dyn AuditLogger>,
}

impl FilterFindingsUseCase {
    pub fn new(client: Arc<dyn AiModelClient>) -> Self {
        Self {
            client,
            config: ReviewConfig::default(),
            custom_instructions: None,
            audit_log: Arc::new(NoAuditLog),
        }
    }

    pub fn with_config(mut self, config: ReviewConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_custom_instructions(mut self, instructions: Option<String>) -> Self {
        self.custom_instructions = instructions.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_audit_logger(mut self, audit_log: Arc<dyn AuditLogger>) -> Self {
        self.audit_log = audit_log;
        self
    }

    /// Ask the model whether one finding is a false positive.
    pub async fn analyze_single_finding(
        &self,
        finding: &Finding,
        pr_context: Option<&PrContext>,
    ) -> Result<FindingVerdict, AnalyzeFindingError> {
        let prompt =
            PromptTemplate::single_finding(finding, pr_context, self.custom_instructions.as_deref());
        let request =
            CompletionRequest::new(prompt).with_system_prompt(PromptTemplate::finding_system());

        let completion = self.client.call_with_retry(request).await?;
        let value =
            parse_json_with_fallbacks(&completion.text).ok_or(AnalyzeFindingError::UnparseableResponse)?;
        FindingVerdict::from_model_output(&value).ok_or(AnalyzeFindingError::InvalidVerdict)
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        report: SecurityReport,
        pr_context: Option<&PrContext>,
    ) -> FilterOutcome {
        self.execute_with_progress(report, pr_context, &NoProgress)
            .await
    }

    /// Execute the use case with progress callbacks.
    ///
    /// Verdicts are applied in the original finding order.
    pub async fn execute_with_progress(
        &self,
        report: SecurityReport,
        pr_context: Option<&PrContext>,
        progress: &dyn ReviewProgressNotifier,
    ) -> FilterOutcome {
        let SecurityReport {
            findings,
            analysis_summary,
        } = report;

        info!(findings = findings.len(), "Filtering findings for false positives");
        progress.on_stage_start(ReviewStage::Filtering, findings.len());

        let verdicts: Vec<_> = stream::iter(findings.iter())
            .map(|finding| async move {
                let verdict = self.analyze_single_finding(finding, pr_context).await;
                let label = format!("{}:{}", finding.file, finding.line.unwrap_or(0));
                progress.on_item_complete(ReviewStage::Filtering, &label, verdict.is_ok());
                verdict
            })
            .buffered(self.config.filter_concurrency.max(1))
            .collect()
            .await;

        let mut kept = Vec::with_capacity(findings.len());
        let mut removed = Vec::new();
        let mut analysis_failures = 0;

        for (mut finding, verdict) in findings.into_iter().zip(verdicts) {
            match verdict {
                Ok(verdict) if verdict.is_false_positive => {
                    debug!(
                        file = %finding.file,
                        confidence = verdict.confidence,
                        "Dropping false positive: {}",
                        verdict.reasoning
                    );
                    self.audit_log.log(AuditEvent::new(
                        "finding_filtered",
                        json!({
                            "file": finding.file,
                            "line": finding.line,
                            "category": finding.category,
                            "confidence": verdict.confidence,
                            "reasoning": verdict.reasoning,
                        }),
                    ));
                    removed.push(RemovedFinding { finding, verdict });
                }
                Ok(verdict) => {
                    if let Some(severity) = verdict.updated_severity {
                        finding.severity = severity;
                    }
                    kept.push(finding);
                }
                Err(e) => {
                    warn!(file = %finding.file, "Keeping finding, analysis failed: {}", e);
                    analysis_failures += 1;
                    kept.push(finding);
                }
            }
        }

        progress.on_stage_complete(ReviewStage::Filtering);
        info!(
            kept = kept.len(),
            removed = removed.len(),
            failures = analysis_failures,
            "Finding filter complete"
        );

        let mut report = SecurityReport {
            findings: kept,
            analysis_summary,
        };
        report.recount();

        FilterOutcome {
            report,
            removed,
            analysis_failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::testing::FakeClient;
    use secreview_domain::{AnalysisSummary, Severity};

    fn finding(file: &str, severity: Severity) -> Finding {
        Finding {
            file: file.to_string(),
            line: Some(7),
            severity,
            category: "injection".to_string(),
            description: format!("issue in {}", file),
            exploit_scenario: String::new(),
            recommendation: String::new(),
            confidence: 0.8,
        }
    }

    fn report(findings: Vec<Finding>) -> SecurityReport {
        SecurityReport {
            findings,
            analysis_summary: AnalysisSummary {
                files_reviewed: 3,
                review_completed: true,
                ..AnalysisSummary::default()
            },
        }
    }

    /// Judges by the file name mentioned in the prompt.
    fn judging_client() -> FakeClient {
        FakeClient::responding(|request| {
            let prompt = &request.prompt;
            if prompt.contains("noise.yml") {
                Ok(r#"{"is_false_positive": true, "confidence": 0.95, "reasoning": "test fixture"}"#
                    .to_string())
            } else if prompt.contains("broken.yml") {
                Ok("no idea".to_string())
            } else {
                Ok(r#"```json
{"is_false_positive": false, "confidence": 0.9, "reasoning": "real", "updated_severity": "CRITICAL"}
```"#
                    .to_string())
            }
        })
    }

    #[tokio::test]
    async fn drops_false_positives_and_keeps_failures() {
        let use_case = FilterFindingsUseCase::new(Arc::new(judging_client()));
        let input = report(vec![
            finding("deploy.yml", Severity::Medium),
            finding("noise.yml", Severity::High),
            finding("broken.yml", Severity::Low),
        ]);

        let outcome = use_case.execute(input, None).await;

        let files: Vec<_> = outcome.report.findings.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(files, vec!["deploy.yml", "broken.yml"]);
        assert_eq!(outcome.removed.len(), 1);
        assert_eq!(outcome.removed[0].verdict.reasoning, "test fixture");
        assert_eq!(outcome.analysis_failures, 1);

        // Severity update applied, counters recomputed
        assert_eq!(outcome.report.findings[0].severity, Severity::Critical);
        let summary = &outcome.report.analysis_summary;
        assert_eq!(summary.high_severity, 1);
        assert_eq!(summary.medium_severity, 0);
        assert_eq!(summary.low_severity, 1);
        assert_eq!(summary.files_reviewed, 3);
    }

    #[tokio::test]
    async fn sends_system_prompt_and_context() {
        let client = Arc::new(judging_client());
        let use_case = FilterFindingsUseCase::new(client.clone())
            .with_custom_instructions(Some("Ignore test fixtures".to_string()));
        let context = PrContext {
            repo_name: "acme/app".to_string(),
            pr_number: 12,
            title: "CI changes".to_string(),
            description: String::new(),
        };

        let verdict = use_case
            .analyze_single_finding(&finding("deploy.yml", Severity::High), Some(&context))
            .await
            .unwrap();
        assert!(!verdict.is_false_positive);

        let requests = client.requests.lock().unwrap();
        assert_eq!(
            requests[0].system_prompt.as_deref(),
            Some(PromptTemplate::finding_system())
        );
        assert!(requests[0].prompt.contains("acme/app"));
        assert!(requests[0].prompt.contains("Ignore test fixtures"));
    }

    #[tokio::test]
    async fn client_error_is_reported() {
        let client = FakeClient::scripted(vec![Err(ClientError::Authentication("bad key".into()))]);
        let use_case = FilterFindingsUseCase::new(Arc::new(client));

        let err = use_case
            .analyze_single_finding(&finding("deploy.yml", Severity::High), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzeFindingError::Client(_)));
    }

    #[tokio::test]
    async fn verdict_without_required_field_is_invalid() {
        let client = FakeClient::scripted(vec![Ok(r#"{"reasoning": "unsure"}"#.to_string())]);
        let use_case = FilterFindingsUseCase::new(Arc::new(client));

        let err = use_case
            .analyze_single_finding(&finding("deploy.yml", Severity::High), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzeFindingError::InvalidVerdict));
    }

    #[tokio::test]
    async fn empty_report_makes_no_calls() {
        let client = Arc::new(judging_client());
        let use_case = FilterFindingsUseCase::new(client.clone());

        let outcome = use_case.execute(SecurityReport::empty(), None).await;
        assert!(outcome.report.findings.is_empty());
        assert_eq!(client.request_count(), 0);
    }
}
