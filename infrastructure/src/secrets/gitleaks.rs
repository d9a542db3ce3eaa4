//! Secret scanner backed by the `gitleaks` CLI.
//!
//! Content is written to a scratch `.diff` file and scanned with
//! `gitleaks detect --no-git`; the JSON report lists each secret with its
//! rule and location. Scratch files live in a temp directory removed on drop.

use async_trait::async_trait;
use secreview_application::{ScanError, SecretScanner};
use secreview_domain::DetectedSecret;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Runs `gitleaks` found on `PATH` (or at an explicit path).
pub struct GitleaksScanner {
    binary: PathBuf,
    version_timeout: Duration,
    scan_timeout: Duration,
}

/// One entry of a gitleaks JSON report
#[derive(Debug, Deserialize)]
struct ReportEntry {
    #[serde(rename = "RuleID", alias = "rule_id", alias = "ruleId", default)]
    rule_id: String,
    #[serde(rename = "Secret", alias = "secret", default)]
    secret: String,
    #[serde(rename = "File", alias = "file", default)]
    file: Option<String>,
    #[serde(rename = "StartLine", alias = "start_line", alias = "startLine", default)]
    start_line: Option<u64>,
}

impl GitleaksScanner {
    pub fn new() -> Self {
        Self::with_binary("gitleaks")
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            version_timeout: Duration::from_secs(10),
            scan_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    fn locate(&self) -> Option<PathBuf> {
        which::which(&self.binary).ok()
    }

    async fn run_detect(&self, binary: &Path, source: &Path, report: &Path) -> Result<(), ScanError> {
        let mut cmd = Command::new(binary);
        cmd.arg("detect")
            .arg("--source")
            .arg(source)
            .arg("--no-git")
            .arg("--report-format")
            .arg("json")
            .arg("--report-path")
            .arg(report)
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.scan_timeout, cmd.output())
            .await
            .map_err(|_| ScanError::Timeout(self.scan_timeout.as_secs()))??;

        debug!(exit_code = ?output.status.code(), "gitleaks detect finished");
        // 0: nothing found, 1: leaks found
        match output.status.code() {
            Some(0) | Some(1) => Ok(()),
            code => Err(ScanError::Failed(format!(
                "gitleaks exited with {:?}: {}",
                code,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }
}

impl Default for GitleaksScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a gitleaks JSON report. An empty report means no findings.
fn parse_report(report: &str) -> Result<Vec<DetectedSecret>, ScanError> {
    if report.trim().is_empty() {
        return Ok(Vec::new());
    }

    let entries: Vec<ReportEntry> =
        serde_json::from_str(report).map_err(|e| ScanError::InvalidReport(e.to_string()))?;

    Ok(entries
        .into_iter()
        .map(|entry| DetectedSecret {
            rule: if entry.rule_id.is_empty() {
                "unknown".to_string()
            } else {
                entry.rule_id
            },
            secret: entry.secret,
            file: entry.file,
            line: entry.start_line,
        })
        .collect())
}

#[async_trait]
impl SecretScanner for GitleaksScanner {
    fn name(&self) -> &str {
        "gitleaks"
    }

    async fn is_available(&self) -> bool {
        let Some(binary) = self.locate() else {
            debug!("gitleaks not found in PATH");
            return false;
        };

        let mut cmd = Command::new(&binary);
        cmd.arg("version").kill_on_drop(true);
        match tokio::time::timeout(self.version_timeout, cmd.output()).await {
            Ok(Ok(output)) if output.status.success() => {
                debug!(
                    "Gitleaks found: {}",
                    String::from_utf8_lossy(&output.stdout).trim()
                );
                true
            }
            Ok(Ok(output)) => {
                warn!(
                    "Gitleaks not available: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                false
            }
            Ok(Err(e)) => {
                warn!("Error checking gitleaks: {}", e);
                false
            }
            Err(_) => {
                warn!("gitleaks version check timed out");
                false
            }
        }
    }

    async fn scan(&self, content: &str) -> Result<Vec<DetectedSecret>, ScanError> {
        let binary = self
            .locate()
            .ok_or_else(|| ScanError::Unavailable("gitleaks not found in PATH".into()))?;

        let scratch = tempfile::Builder::new().prefix("secreview-scan").tempdir()?;
        let source = scratch.path().join("content.diff");
        let report = scratch.path().join("report.json");
        tokio::fs::write(&source, content).await?;
        debug!(chars = content.len(), "Scanning content with gitleaks");

        self.run_detect(&binary, &source, &report).await?;

        let report_text = match tokio::fs::read_to_string(&report).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let secrets = parse_report(&report_text)?;
        if !secrets.is_empty() {
            info!(count = secrets.len(), "gitleaks reported secrets");
        }
        Ok(secrets)
    }
}
