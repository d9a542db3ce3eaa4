//! Console output formatter for review results

use colored::Colorize;
use secreview_application::{
    FilterOutcome, MaskResult, MaskStatus, ReviewPullRequestOutput,
};
use secreview_domain::{ConfigIssue, Finding, ModelProvider, SecurityReport, Severity};
use serde_json::{Value, json};

/// Formats review results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a full pull request review
    pub fn format_review(output: &ReviewPullRequestOutput) -> String {
        let mut text = Self::format_report(&output.report);

        if let Some(masking) = &output.masking {
            text.push_str(&format!(
                "{} {}\n",
                "Secret masking:".cyan().bold(),
                Self::mask_status_line(&masking.status)
            ));
        }
        if !output.diff_included {
            text.push_str(&format!(
                "{}\n",
                "Diff not included in the prompt; the model inspected files directly.".yellow()
            ));
        }
        if let Some(filtering) = &output.filtering {
            text.push_str(&Self::filter_summary(filtering));
        }

        text.push_str(&Self::footer());
        text
    }

    /// Format a bare report
    pub fn format_report(report: &SecurityReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Security Review"));
        output.push('\n');

        let summary = &report.analysis_summary;
        output.push_str(&format!(
            "{} {}   {} {}   {} {}   {} {}\n",
            "Files reviewed:".cyan().bold(),
            summary.files_reviewed,
            "High:".red().bold(),
            summary.high_severity,
            "Medium:".yellow().bold(),
            summary.medium_severity,
            "Low:".bold(),
            summary.low_severity
        ));
        if !summary.review_completed {
            output.push_str(&format!("{}\n", "Review did not complete".yellow()));
        }

        if report.findings.is_empty() {
            output.push_str(&format!("\n{}\n\n", "No security findings.".green().bold()));
            return output;
        }

        output.push_str(&Self::section_header(&format!(
            "Findings ({})",
            report.findings.len()
        )));
        for (index, finding) in report.findings.iter().enumerate() {
            output.push_str(&Self::format_finding(index + 1, finding));
        }
        output.push('\n');

        output
    }

    /// Format the outcome of a standalone filter run
    pub fn format_filter_outcome(outcome: &FilterOutcome) -> String {
        let mut output = Self::format_report(&outcome.report);
        output.push_str(&Self::filter_summary(outcome));
        output.push_str(&Self::footer());
        output
    }

    /// One line per supported provider
    pub fn format_providers(current: Option<ModelProvider>) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", "Supported providers:".cyan().bold()));
        for provider in ModelProvider::ALL {
            let marker = if Some(provider) == current { "*" } else { " " };
            let endpoint = if provider.requires_endpoint() {
                ", endpoint required"
            } else {
                ""
            };
            output.push_str(&format!(
                "{} {:<14} {:<18} model: {}  key: {}{}\n",
                marker,
                provider.as_str().bold(),
                provider.display_name(),
                provider.default_model(),
                provider.api_key_env(),
                endpoint
            ));
        }
        output
    }

    /// Configuration issues, errors first
    pub fn format_config_issues(issues: &[ConfigIssue]) -> String {
        let mut sorted: Vec<&ConfigIssue> = issues.iter().collect();
        sorted.sort_by_key(|issue| !issue.is_error());

        sorted
            .into_iter()
            .map(|issue| {
                if issue.is_error() {
                    format!("{} {}", "error:".red().bold(), issue.message)
                } else {
                    format!("{} {}", "warning:".yellow().bold(), issue.message)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format as JSON
    pub fn format_report_json(report: &SecurityReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_filter_json(outcome: &FilterOutcome) -> String {
        Self::pretty(Self::filter_value(outcome, &outcome.report))
    }

    pub fn format_review_json(output: &ReviewPullRequestOutput) -> String {
        let mut value = match &output.filtering {
            Some(filtering) => Self::filter_value(filtering, &output.report),
            None => serde_json::to_value(&output.report).unwrap_or_else(|_| json!({})),
        };
        if let Some(object) = value.as_object_mut() {
            object.insert("diff_included".into(), json!(output.diff_included));
            if let Some(masking) = &output.masking {
                object.insert("secret_masking".into(), Self::mask_status_value(masking));
            }
        }
        Self::pretty(value)
    }

    fn filter_value(outcome: &FilterOutcome, report: &SecurityReport) -> Value {
        let mut value = serde_json::to_value(report).unwrap_or_else(|_| json!({}));
        let removed: Vec<Value> = outcome
            .removed
            .iter()
            .map(|removed| {
                json!({
                    "finding": removed.finding,
                    "verdict": removed.verdict,
                })
            })
            .collect();
        if let Some(object) = value.as_object_mut() {
            object.insert(
                "filtering_summary".into(),
                json!({
                    "removed": removed,
                    "analysis_failures": outcome.analysis_failures,
                }),
            );
        }
        value
    }

    fn mask_status_value(masking: &MaskResult) -> Value {
        match &masking.status {
            MaskStatus::Empty => json!({"status": "empty"}),
            MaskStatus::Masked {
                secrets,
                replacements,
            } => json!({
                "status": "masked",
                "secrets": secrets,
                "replacements": replacements,
            }),
            MaskStatus::ScannerUnavailable => json!({"status": "scanner_unavailable"}),
            MaskStatus::ScanFailed(error) => json!({"status": "scan_failed", "error": error}),
        }
    }

    fn mask_status_line(status: &MaskStatus) -> String {
        match status {
            MaskStatus::Empty => "nothing to scan".to_string(),
            MaskStatus::Masked {
                secrets: 0,
                replacements: _,
            } => "no secrets detected".green().to_string(),
            MaskStatus::Masked {
                secrets,
                replacements,
            } => format!(
                "{} secret(s) redacted in {} place(s)",
                secrets, replacements
            )
            .yellow()
            .to_string(),
            MaskStatus::ScannerUnavailable => "gitleaks not installed, diff sent unmasked"
                .yellow()
                .to_string(),
            MaskStatus::ScanFailed(error) => format!("scan failed ({}), diff sent unmasked", error)
                .red()
                .to_string(),
        }
    }

    fn filter_summary(outcome: &FilterOutcome) -> String {
        let mut output = String::new();
        output.push_str(&Self::section_header("False-positive filtering"));
        output.push_str(&format!(
            "{} kept, {} removed, {} could not be analyzed\n",
            outcome.report.findings.len(),
            outcome.removed.len(),
            outcome.analysis_failures
        ));
        for removed in &outcome.removed {
            output.push_str(&format!(
                "  {} {}: {} ({:.0}% confident)\n",
                "-".dimmed(),
                Self::location(&removed.finding),
                removed.verdict.reasoning,
                removed.verdict.confidence * 100.0
            ));
        }
        output
    }

    fn format_finding(index: usize, finding: &Finding) -> String {
        let mut output = format!(
            "\n{} {} {}\n",
            format!("{}.", index).bold(),
            Self::severity_label(finding.severity),
            Self::location(finding).bold()
        );
        if !finding.category.is_empty() {
            output.push_str(&format!("   {} {}\n", "Category:".dimmed(), finding.category));
        }
        output.push_str(&Self::indent(&finding.description, "   "));
        output.push('\n');
        if !finding.exploit_scenario.is_empty() {
            output.push_str(&format!("   {}\n", "Exploit scenario:".cyan()));
            output.push_str(&Self::indent(&finding.exploit_scenario, "     "));
            output.push('\n');
        }
        if !finding.recommendation.is_empty() {
            output.push_str(&format!("   {}\n", "Recommendation:".green()));
            output.push_str(&Self::indent(&finding.recommendation, "     "));
            output.push('\n');
        }
        output.push_str(&format!(
            "   {} {:.0}%\n",
            "Confidence:".dimmed(),
            finding.confidence * 100.0
        ));
        output
    }

    fn severity_label(severity: Severity) -> String {
        let label = format!("[{}]", severity);
        match severity {
            Severity::Critical => label.on_red().white().bold().to_string(),
            Severity::High => label.red().bold().to_string(),
            Severity::Medium => label.yellow().bold().to_string(),
            Severity::Low => label.normal().to_string(),
        }
    }

    fn location(finding: &Finding) -> String {
        match finding.line {
            Some(line) => format!("{}:{}", finding.file, line),
            None => finding.file.clone(),
        }
    }

    fn pretty(value: Value) -> String {
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
