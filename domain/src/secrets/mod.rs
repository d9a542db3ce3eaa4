//! Secret masking for diffs sent to AI providers.

use serde::{Deserialize, Serialize};

/// Placeholder written in place of every detected secret
pub const REDACTION_PLACEHOLDER: &str = "[REDACTED_SECRET]";

/// A secret reported by a scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedSecret {
    /// Scanner rule that matched (e.g. `generic-api-key`)
    pub rule: String,
    /// The literal secret value
    pub secret: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u64>,
}

/// How many times one secret was replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redaction {
    pub rule: String,
    pub occurrences: usize,
}

/// Result of masking a piece of content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskOutcome {
    pub content: String,
    pub redactions: Vec<Redaction>,
    /// Secrets skipped because their value was blank
    pub skipped: usize,
}

impl MaskOutcome {
    pub fn total_replacements(&self) -> usize {
        self.redactions.iter().map(|r| r.occurrences).sum()
    }
}

/// Replace every occurrence of each detected secret with the placeholder.
///
/// Longer values are replaced first so a secret that contains another one
/// is never left partly visible. Blank values are skipped.
pub fn mask_secrets(content: &str, secrets: &[DetectedSecret]) -> MaskOutcome {
    let mut masked = content.to_string();
    let mut redactions = Vec::new();

    let (blank, mut ordered): (Vec<&DetectedSecret>, Vec<&DetectedSecret>) = secrets
        .iter()
        .partition(|secret| secret.secret.trim().is_empty());
    let skipped = blank.len();
    ordered.sort_by(|a, b| b.secret.len().cmp(&a.secret.len()));

    for secret in ordered {
        let occurrences = masked.matches(secret.secret.as_str()).count();
        if occurrences > 0 {
            masked = masked.replace(secret.secret.as_str(), REDACTION_PLACEHOLDER);
        }
        redactions.push(Redaction {
            rule: secret.rule.clone(),
            occurrences,
        });
    }

    MaskOutcome {
        content: masked,
        redactions,
        skipped,
    }
}

/// Short, non-revealing preview of a secret for log lines
pub fn preview(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() > 4 {
        format!("{}***", visible)
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(rule: &str, value: &str) -> DetectedSecret {
        DetectedSecret {
            rule: rule.to_string(),
            secret: value.to_string(),
            file: None,
            line: None,
        }
    }

    #[test]
    fn test_masks_every_occurrence() {
        let diff = "+API_KEY=abc123xyz\n+echo abc123xyz\n";
        let outcome = mask_secrets(diff, &[secret("generic-api-key", "abc123xyz")]);
        assert_eq!(
            outcome.content,
            "+API_KEY=[REDACTED_SECRET]\n+echo [REDACTED_SECRET]\n"
        );
        assert_eq!(outcome.total_replacements(), 2);
        assert_eq!(outcome.redactions[0].rule, "generic-api-key");
    }

    #[test]
    fn test_blank_secrets_are_skipped() {
        let outcome = mask_secrets("content", &[secret("r", "   "), secret("r2", "")]);
        assert_eq!(outcome.content, "content");
        assert_eq!(outcome.skipped, 2);
        assert!(outcome.redactions.is_empty());
    }

    #[test]
    fn test_secret_not_present() {
        let outcome = mask_secrets("nothing here", &[secret("r", "token")]);
        assert_eq!(outcome.content, "nothing here");
        assert_eq!(outcome.total_replacements(), 0);
        assert_eq!(outcome.redactions.len(), 1);
    }

    #[test]
    fn test_overlapping_secrets_fully_masked() {
        let outcome = mask_secrets(
            "TOKEN=abc123SUPERSECRETTAIL\nshort=abc123\n",
            &[
                secret("short-key", "abc123"),
                secret("long-key", "abc123SUPERSECRETTAIL"),
            ],
        );
        assert_eq!(
            outcome.content,
            "TOKEN=[REDACTED_SECRET]\nshort=[REDACTED_SECRET]\n"
        );
        assert!(!outcome.content.contains("SUPERSECRETTAIL"));
        assert_eq!(outcome.redactions[0].rule, "long-key");
        assert_eq!(outcome.redactions[0].occurrences, 1);
        assert_eq!(outcome.redactions[1].rule, "short-key");
        assert_eq!(outcome.redactions[1].occurrences, 1);
    }

    #[test]
    fn test_preview_hides_value() {
        assert_eq!(preview("ghp_abcdefgh"), "ghp_***");
        assert_eq!(preview("abc"), "***");
    }
}
