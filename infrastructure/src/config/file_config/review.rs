//! Review behavior from TOML (`[review]` section)

use secreview_application::ReviewConfig;
use serde::{Deserialize, Serialize};

/// Review settings.
///
/// `comment_pr`, `run_every_commit` and `upload_results` are read by the
/// workflow that invokes the binary; they are carried here so one file
/// describes the whole setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReviewConfig {
    /// Whole-audit time limit in minutes; 0 disables it
    pub timeout_minutes: Option<u64>,
    pub comment_pr: bool,
    pub run_every_commit: bool,
    pub upload_results: bool,
    /// Run the false-positive filter after the audit
    pub filter_findings: bool,
    /// Mask secrets in the diff before sending it
    pub mask_secrets: bool,
    pub custom_scan_instructions: Option<String>,
    pub custom_filtering_instructions: Option<String>,
}

impl Default for FileReviewConfig {
    fn default() -> Self {
        Self {
            timeout_minutes: None,
            comment_pr: true,
            run_every_commit: false,
            upload_results: true,
            filter_findings: true,
            mask_secrets: true,
            custom_scan_instructions: None,
            custom_filtering_instructions: None,
        }
    }
}

impl FileReviewConfig {
    pub fn to_review_config(&self) -> ReviewConfig {
        ReviewConfig::from_timeout_minutes(self.timeout_minutes)
    }
}
