//! Review Pull Request use case
//!
//! Full pipeline for one pull request: mask the diff, build the audit prompt,
//! run the audit and filter false positives.

use super::filter_findings::{FilterFindingsUseCase, FilterOutcome};
use super::mask_secrets::{MaskResult, MaskSecretsUseCase};
use super::run_security_audit::{RunAuditError, RunSecurityAuditUseCase};
use crate::ports::progress::{NoProgress, ReviewProgressNotifier};
use secreview_domain::{PromptTemplate, PullRequest, SecurityReport};
use std::path::PathBuf;
use tracing::{info, warn};

/// Input for a pull request review
#[derive(Debug, Clone)]
pub struct ReviewPullRequestInput {
    pub repo_dir: PathBuf,
    pub pull_request: PullRequest,
    pub diff: Option<String>,
    pub custom_scan_instructions: Option<String>,
}

/// Output of a pull request review
#[derive(Debug, Clone)]
pub struct ReviewPullRequestOutput {
    pub report: SecurityReport,
    /// Present when masking ran
    pub masking: Option<MaskResult>,
    /// Present when filtering ran
    pub filtering: Option<FilterOutcome>,
    pub diff_included: bool,
}

/// Use case composing masking, audit and filtering
pub struct ReviewPullRequestUseCase {
    audit: RunSecurityAuditUseCase,
    masker: Option<MaskSecretsUseCase>,
    filter: Option<FilterFindingsUseCase>,
    /// Diffs larger than this are left out of the prompt
    max_diff_bytes: usize,
}

impl ReviewPullRequestUseCase {
    pub fn new(audit: RunSecurityAuditUseCase) -> Self {
        Self {
            audit,
            masker: None,
            filter: None,
            max_diff_bytes: 1024 * 1024,
        }
    }

    pub fn with_masking(mut self, masker: MaskSecretsUseCase) -> Self {
        self.masker = Some(masker);
        self
    }

    pub fn with_filter(mut self, filter: FilterFindingsUseCase) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_max_diff_bytes(mut self, max_diff_bytes: usize) -> Self {
        self.max_diff_bytes = max_diff_bytes;
        self
    }

    pub async fn execute(
        &self,
        input: ReviewPullRequestInput,
    ) -> Result<ReviewPullRequestOutput, RunAuditError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        input: ReviewPullRequestInput,
        progress: &dyn ReviewProgressNotifier,
    ) -> Result<ReviewPullRequestOutput, RunAuditError> {
        let pr = &input.pull_request;
        info!(
            repo = pr.repo_name(),
            pr = pr.number,
            "Reviewing pull request"
        );

        let masking = match (&self.masker, input.diff.as_deref()) {
            (Some(masker), Some(diff)) => Some(masker.execute_with_progress(diff, progress).await),
            _ => None,
        };
        let diff = masking
            .as_ref()
            .map(|m| m.content.as_str())
            .or(input.diff.as_deref());

        let diff_included = diff.is_some_and(|d| d.len() <= self.max_diff_bytes);
        if let Some(d) = diff
            && !diff_included
        {
            warn!(
                diff_bytes = d.len(),
                "Diff too large, omitting it from the prompt"
            );
        }

        let prompt = PromptTemplate::security_audit(
            pr,
            diff,
            diff_included,
            input.custom_scan_instructions.as_deref(),
        );

        let report = self
            .audit
            .execute_with_progress(&input.repo_dir, &prompt, progress)
            .await?;

        let (report, filtering) = match &self.filter {
            Some(filter) if report.has_findings() => {
                let context = pr.context();
                let outcome = filter
                    .execute_with_progress(report, Some(&context), progress)
                    .await;
                (outcome.report.clone(), Some(outcome))
            }
            _ => (report, None),
        };

        Ok(ReviewPullRequestOutput {
            report,
            masking,
            filtering,
            diff_included,
        })
    }
}
