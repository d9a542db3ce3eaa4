//! Mask Secrets use case
//!
//! Redacts secrets found by a [`SecretScanner`] before content is sent to a
//! provider. Masking is best effort: when the scanner is missing or fails,
//! the original content is returned with a warning.

use crate::ports::progress::{NoProgress, ReviewProgressNotifier, ReviewStage};
use crate::ports::secret_scanner::SecretScanner;
use secreview_domain::mask_secrets;
use secreview_domain::secrets::preview;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How masking ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskStatus {
    /// Nothing to scan
    Empty,
    /// Scanner ran; `replacements` occurrences were redacted
    Masked { secrets: usize, replacements: usize },
    /// Scanner not installed; content unchanged
    ScannerUnavailable,
    /// Scanner failed; content unchanged
    ScanFailed(String),
}

/// Masked (or original) content plus how it was produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskResult {
    pub content: String,
    pub status: MaskStatus,
}

impl MaskResult {
    fn unchanged(content: &str, status: MaskStatus) -> Self {
        Self {
            content: content.to_string(),
            status,
        }
    }
}

/// Use case for masking secrets in a diff
pub struct MaskSecretsUseCase {
    scanner: Arc<dyn SecretScanner>,
}

impl MaskSecretsUseCase {
    pub fn new(scanner: Arc<dyn SecretScanner>) -> Self {
        Self { scanner }
    }

    pub async fn execute(&self, content: &str) -> MaskResult {
        self.execute_with_progress(content, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        content: &str,
        progress: &dyn ReviewProgressNotifier,
    ) -> MaskResult {
        if content.trim().is_empty() {
            return MaskResult::unchanged(content, MaskStatus::Empty);
        }

        if !self.scanner.is_available().await {
            warn!(
                scanner = self.scanner.name(),
                "Secret scanner not available, sending content without masking"
            );
            return MaskResult::unchanged(content, MaskStatus::ScannerUnavailable);
        }

        progress.on_stage_start(ReviewStage::Masking, 1);
        let result = match self.scanner.scan(content).await {
            Ok(secrets) if secrets.is_empty() => {
                debug!("No secrets detected");
                MaskResult {
                    content: content.to_string(),
                    status: MaskStatus::Masked {
                        secrets: 0,
                        replacements: 0,
                    },
                }
            }
            Ok(secrets) => {
                for secret in &secrets {
                    debug!(
                        rule = %secret.rule,
                        file = secret.file.as_deref().unwrap_or("-"),
                        "Masking secret {}",
                        preview(&secret.secret)
                    );
                }
                let outcome = mask_secrets(content, &secrets);
                let replacements = outcome.total_replacements();
                info!(
                    secrets = secrets.len(),
                    replacements, "Masked secrets before sending content to the provider"
                );
                MaskResult {
                    content: outcome.content,
                    status: MaskStatus::Masked {
                        secrets: secrets.len(),
                        replacements,
                    },
                }
            }
            Err(e) => {
                warn!(
                    scanner = self.scanner.name(),
                    "Secret scan failed, sending content without masking: {}", e
                );
                MaskResult::unchanged(content, MaskStatus::ScanFailed(e.to_string()))
            }
        };

        let success = !matches!(result.status, MaskStatus::ScanFailed(_));
        progress.on_item_complete(ReviewStage::Masking, self.scanner.name(), success);
        progress.on_stage_complete(ReviewStage::Masking);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::secret_scanner::ScanError;
    use crate::use_cases::testing::{FakeScanner, secret};
    use secreview_domain::REDACTION_PLACEHOLDER;

    const DIFF: &str = "+ env:\n+   TOKEN: ghp_abcdef123456\n+   AGAIN: ghp_abcdef123456\n";

    #[tokio::test]
    async fn masks_every_occurrence() {
        let scanner = FakeScanner::finding(vec![secret("github-pat", "ghp_abcdef123456")]);
        let use_case = MaskSecretsUseCase::new(Arc::new(scanner));

        let result = use_case.execute(DIFF).await;
        assert!(!result.content.contains("ghp_abcdef123456"));
        assert_eq!(result.content.matches(REDACTION_PLACEHOLDER).count(), 2);
        assert_eq!(
            result.status,
            MaskStatus::Masked {
                secrets: 1,
                replacements: 2
            }
        );
    }

    #[tokio::test]
    async fn unavailable_scanner_returns_original() {
        let use_case = MaskSecretsUseCase::new(Arc::new(FakeScanner::unavailable()));
        let result = use_case.execute(DIFF).await;
        assert_eq!(result.content, DIFF);
        assert_eq!(result.status, MaskStatus::ScannerUnavailable);
    }

    #[tokio::test]
    async fn failed_scan_returns_original() {
        let scanner = FakeScanner::failing(ScanError::Timeout(30));
        let use_case = MaskSecretsUseCase::new(Arc::new(scanner));
        let result = use_case.execute(DIFF).await;
        assert_eq!(result.content, DIFF);
        assert!(matches!(result.status, MaskStatus::ScanFailed(_)));
    }

    #[tokio::test]
    async fn blank_content_is_not_scanned() {
        let scanner = FakeScanner::finding(vec![secret("generic", "x")]);
        let use_case = MaskSecretsUseCase::new(Arc::new(scanner));
        let result = use_case.execute("   ").await;
        assert_eq!(result.content, "   ");
        assert_eq!(result.status, MaskStatus::Empty);
    }
}
