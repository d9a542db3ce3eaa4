//! Domain layer for secreview
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Provider / Model**: which AI vendor answers, and which model or
//!   deployment it uses
//! - **ClientConfig / RetryPolicy**: resolved settings for one client
//! - **SecurityReport**: findings parsed from a model reply
//! - **Masking**: redaction of detected secrets before content leaves the host

pub mod core;
pub mod prompt;
pub mod providers;
pub mod review;
pub mod secrets;

// Re-export commonly used types
pub use core::{
    error::DomainError,
    model::Model,
    provider::ModelProvider,
    validation::{ConfigIssue, ConfigIssueCode, IssueLevel},
};
pub use prompt::PromptTemplate;
pub use providers::{
    ApiKey, AzureSettings, ClientConfig, DEFAULT_AZURE_API_VERSION, RetryPolicy,
    validate_endpoint,
};
pub use review::{
    finding::{
        AnalysisSummary, DecodedReport, Finding, RejectedFinding, SecurityReport, Severity,
    },
    parsing::parse_json_with_fallbacks,
    pull_request::{ChangedFile, PrContext, PullRequest},
    verdict::FindingVerdict,
};
pub use secrets::{
    DetectedSecret, MaskOutcome, REDACTION_PLACEHOLDER, Redaction, mask_secrets,
};
