//! Pull request data used to build prompts

use serde::{Deserialize, Serialize};

/// A file touched by the pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
}

/// Pull request metadata, in the shape returned by the GitHub REST API.
///
/// Only the fields the prompts need are decoded; everything else is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "author_login")]
    pub user: String,
    #[serde(default)]
    pub repo_full_name: Option<String>,
    #[serde(default)]
    pub changed_files: u32,
    #[serde(default)]
    pub additions: u32,
    #[serde(default)]
    pub deletions: u32,
    #[serde(default)]
    pub files: Vec<ChangedFile>,
}

impl PullRequest {
    /// Decode a GitHub API payload, picking the repository name from
    /// `head.repo.full_name` when no top-level `repo_full_name` is present.
    pub fn from_github_json(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut pr: PullRequest = serde_json::from_value(value.clone())?;
        if pr.repo_full_name.is_none() {
            pr.repo_full_name = value
                .pointer("/head/repo/full_name")
                .and_then(|v| v.as_str())
                .map(str::to_string);
        }
        Ok(pr)
    }

    pub fn repo_name(&self) -> &str {
        self.repo_full_name.as_deref().unwrap_or("unknown")
    }

    /// Context handed to the per-finding prompt
    pub fn context(&self) -> PrContext {
        PrContext {
            repo_name: self.repo_name().to_string(),
            pr_number: self.number,
            title: self.title.clone(),
            description: self.body.clone().unwrap_or_default(),
        }
    }
}

/// `user` is either a login string or a GitHub user object.
fn author_login<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Object(map) => map
            .get("login")
            .and_then(|l| l.as_str())
            .unwrap_or("unknown")
            .to_string(),
        _ => "unknown".to_string(),
    })
}

/// Short PR description for single-finding analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrContext {
    pub repo_name: String,
    pub pr_number: u64,
    pub title: String,
    pub description: String,
}
