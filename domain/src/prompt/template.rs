//! Prompt templates for the security review flow

use crate::review::finding::Finding;
use crate::review::pull_request::{PrContext, PullRequest};

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

const SECURITY_CATEGORIES: &str = r#"GITHUB ACTIONS WORKFLOW SECURITY CATEGORIES:

**Secrets & Environment Variables:**
- Hardcoded secrets, API keys, or tokens in workflow files
- Secrets exposed in logs or step outputs, missing masking
- Secrets passed to untrusted actions or scripts

**Action Security:**
- Untrusted or unverified third-party actions
- Missing version pinning (using @main or @master)
- Actions that download and execute code from external sources

**Permission & Access Control:**
- Excessive GITHUB_TOKEN permissions (write-all, admin)
- Workflows that can modify repository settings or other workflows
- Missing branch protection or environment restrictions

**Code Injection & Execution:**
- Command injection in run steps via user inputs
- Unsafe use of ${{ }} expressions with github.event data
- Execution of untrusted code from external sources

**Workflow Triggers & Configuration:**
- pull_request_target or workflow_dispatch without proper validation
- Workflows triggerable by forks without isolation
- Missing required approvals for sensitive workflows

**Artifact, Cache & Supply Chain:**
- Cache poisoning, artifacts containing sensitive data
- Unpinned or unverified dependencies, untrusted package sources
- Untrusted container images or containers with excessive privileges

**Network & External Access:**
- Insecure external calls, missing TLS or certificate validation
- Workflows exposing internal services"#;

const METHODOLOGY: &str = r#"ANALYSIS METHODOLOGY:

Phase 1 - Workflow Structure Analysis:
- Identify workflow files, their triggers and permissions
- Review secret management, action usage and version pinning

Phase 2 - Security Control Review:
- Verify least privilege, approvals and environment restrictions
- Validate trigger conditions and event data handling

Phase 3 - Vulnerability Assessment:
- Look for injection points, privilege escalation and data exposure
- Assess supply chain, container and runner risks"#;

const OUTPUT_FORMAT: &str = r#"REQUIRED OUTPUT FORMAT:

You MUST output your findings as structured JSON with this exact schema:

{
  "findings": [
    {
      "file": ".github/workflows/deploy.yml",
      "line": 15,
      "severity": "HIGH",
      "category": "secret_exposure",
      "description": "API key hardcoded in workflow file instead of using GitHub Secrets",
      "exploit_scenario": "Anyone with read access to the repository can see the API key",
      "recommendation": "Move the API key to GitHub Secrets and reference it via ${{ secrets.API_KEY }}",
      "confidence": 0.95
    }
  ],
  "analysis_summary": {
    "files_reviewed": 3,
    "high_severity": 1,
    "medium_severity": 0,
    "low_severity": 0,
    "review_completed": true
  }
}

SEVERITY GUIDELINES:
- **HIGH**: could lead to repository compromise, secret exposure, or unauthorized code execution
- **MEDIUM**: could lead to privilege escalation or data exposure under specific conditions
- **LOW**: improves security posture but has limited immediate impact

CONFIDENCE SCORING:
- 0.9-1.0: Clear vulnerability with known exploitation methods
- 0.8-0.9: Obvious security misconfiguration
- 0.7-0.8: Suspicious pattern requiring specific conditions to exploit
- Below 0.7: Don't report (too speculative)

IMPORTANT EXCLUSIONS - DO NOT REPORT:
- General code quality, performance or naming issues
- Missing documentation or comments
- Structural issues without security implications

Focus on CRITICAL, HIGH and MEDIUM findings only. Better to miss some theoretical issues than flood the report with false positives.

Your final reply must contain the JSON and nothing else."#;

impl PromptTemplate {
    /// Full audit prompt for one pull request.
    ///
    /// The diff is embedded only when `include_diff` is set; a diff that was
    /// provided but left out gets a note so the model knows to look at files.
    pub fn security_audit(
        pr: &PullRequest,
        diff: Option<&str>,
        include_diff: bool,
        custom_scan_instructions: Option<&str>,
    ) -> String {
        let files_changed = pr
            .files
            .iter()
            .map(|f| format!("- {}", f.filename))
            .collect::<Vec<_>>()
            .join("\n");

        let diff_section = match diff {
            Some(diff) if include_diff => format!(
                "\n\nPR DIFF CONTENT:\n```\n{}\n```\n\nReview the complete diff above. This contains all code changes in the PR.\n",
                diff
            ),
            Some(_) => "\n\nNOTE: PR diff was omitted due to size constraints. Please examine the specific files that were changed in this PR.\n".to_string(),
            None => String::new(),
        };

        let custom_section = custom_scan_instructions
            .filter(|s| !s.trim().is_empty())
            .map(|s| format!("\n{}\n", s))
            .unwrap_or_default();

        format!(
            r#"
You are a senior security engineer conducting a focused security review of GitHub Actions workflows in PR #{number}: "{title}"

CONTEXT:
- Repository: {repo}
- Author: {author}
- Files changed: {changed}
- Lines added: {additions}
- Lines deleted: {deletions}

Files modified:
{files}{diff}

OBJECTIVE:
Perform a security-focused review to identify HIGH-CONFIDENCE vulnerabilities introduced by this PR that could lead to unauthorized access, secret exposure, or CI/CD compromise.

{categories}
{custom}
{methodology}

{output}
"#,
            number = pr.number,
            title = pr.title,
            repo = pr.repo_name(),
            author = pr.user,
            changed = pr.changed_files,
            additions = pr.additions,
            deletions = pr.deletions,
            files = files_changed,
            diff = diff_section,
            categories = SECURITY_CATEGORIES,
            custom = custom_section,
            methodology = METHODOLOGY,
            output = OUTPUT_FORMAT,
        )
    }

    /// System prompt for single-finding analysis
    pub fn finding_system() -> &'static str {
        r#"You are a senior security engineer conducting a comprehensive security review.
Your objective is to identify security vulnerabilities and provide structured JSON output.

Respond ONLY with valid JSON in the exact format specified in the user prompt.
Do not include explanatory text, markdown formatting, or code blocks."#
    }

    /// User prompt asking whether one finding is a false positive
    pub fn single_finding(
        finding: &Finding,
        pr_context: Option<&PrContext>,
        custom_filtering_instructions: Option<&str>,
    ) -> String {
        let pr_info = pr_context
            .map(|ctx| {
                format!(
                    "\nPR Context:\n- Repository: {}\n- PR Number: {}\n- Title: {}\n- Description: {}\n",
                    ctx.repo_name, ctx.pr_number, ctx.title, ctx.description
                )
            })
            .unwrap_or_default();

        let custom = custom_filtering_instructions
            .filter(|s| !s.trim().is_empty())
            .map(|s| format!("\n\nCustom Filtering Instructions:\n{}", s))
            .unwrap_or_default();

        let finding_json =
            serde_json::to_string_pretty(finding).unwrap_or_else(|_| "{}".to_string());

        format!(
            r#"You are a senior security engineer reviewing a potential security finding.
{pr_info}
Security Finding to Review:
{finding_json}
{custom}

Your task is to determine if this finding is a FALSE POSITIVE or a VALID security issue.

Consider:
1. Is this a real security vulnerability or just a false positive?
2. Is the confidence score appropriate for the severity?
3. Is the exploit scenario realistic?
4. Is the recommendation actionable?

Respond with JSON in this exact format:
{{
  "is_false_positive": true/false,
  "confidence": 0.0-1.0,
  "reasoning": "Brief explanation of your decision",
  "updated_severity": "CRITICAL/HIGH/MEDIUM/LOW" (if not false positive)
}}

Respond ONLY with the JSON, no other text."#
        )
    }

    /// Minimal prompt used to check that credentials and model work
    pub fn access_check_prompt() -> &'static str {
        "Hello"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::finding::Severity;
    use crate::review::pull_request::ChangedFile;

    fn pr() -> PullRequest {
        PullRequest {
            number: 7,
            title: "Add release workflow".to_string(),
            body: Some("Publishes on tag".to_string()),
            user: "octocat".to_string(),
            repo_full_name: Some("acme/app".to_string()),
            changed_files: 1,
            additions: 20,
            deletions: 0,
            files: vec![ChangedFile {
                filename: ".github/workflows/release.yml".to_string(),
            }],
        }
    }

    fn finding() -> Finding {
        Finding {
            file: ".github/workflows/release.yml".to_string(),
            line: Some(12),
            severity: Severity::High,
            category: "command_injection".to_string(),
            description: "PR title interpolated into run step".to_string(),
            exploit_scenario: "Attacker crafts a PR title".to_string(),
            recommendation: "Pass through an env var".to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_audit_prompt_includes_pr_context() {
        let prompt = PromptTemplate::security_audit(&pr(), None, true, None);
        assert!(prompt.contains("PR #7: \"Add release workflow\""));
        assert!(prompt.contains("- Repository: acme/app"));
        assert!(prompt.contains("- Author: octocat"));
        assert!(prompt.contains("- .github/workflows/release.yml"));
        assert!(prompt.contains("\"findings\""));
        assert!(!prompt.contains("PR DIFF CONTENT"));
    }

    #[test]
    fn test_audit_prompt_diff_handling() {
        let with_diff = PromptTemplate::security_audit(&pr(), Some("+run: echo hi"), true, None);
        assert!(with_diff.contains("PR DIFF CONTENT:\n```\n+run: echo hi\n```"));

        let omitted = PromptTemplate::security_audit(&pr(), Some("+run: echo hi"), false, None);
        assert!(omitted.contains("PR diff was omitted"));
        assert!(!omitted.contains("+run: echo hi"));
    }

    #[test]
    fn test_audit_prompt_custom_instructions() {
        let prompt = PromptTemplate::security_audit(
            &pr(),
            None,
            true,
            Some("**Custom:**\n- Self-hosted runner misuse"),
        );
        assert!(prompt.contains("Self-hosted runner misuse"));
    }

    #[test]
    fn test_single_finding_prompt() {
        let ctx = pr().context();
        let prompt =
            PromptTemplate::single_finding(&finding(), Some(&ctx), Some("Ignore test files"));
        assert!(prompt.contains("PR Number: 7"));
        assert!(prompt.contains("\"category\": \"command_injection\""));
        assert!(prompt.contains("Custom Filtering Instructions:\nIgnore test files"));
        assert!(prompt.contains("\"is_false_positive\": true/false"));
    }

    #[test]
    fn test_single_finding_prompt_without_context() {
        let prompt = PromptTemplate::single_finding(&finding(), None, None);
        assert!(!prompt.contains("PR Context"));
        assert!(!prompt.contains("Custom Filtering Instructions"));
    }
}
