//! Application layer for secreview
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ReviewConfig;
pub use ports::{
    audit_log::{AuditEvent, AuditLogger, NoAuditLog},
    model_client::{AiModelClient, ClientError, Completion, CompletionRequest},
    progress::{NoProgress, ReviewProgressNotifier, ReviewStage},
    secret_scanner::{ScanError, SecretScanner},
};
pub use use_cases::filter_findings::{
    AnalyzeFindingError, FilterFindingsUseCase, FilterOutcome, RemovedFinding,
};
pub use use_cases::mask_secrets::{MaskResult, MaskSecretsUseCase, MaskStatus};
pub use use_cases::review_pull_request::{
    ReviewPullRequestInput, ReviewPullRequestOutput, ReviewPullRequestUseCase,
};
pub use use_cases::run_security_audit::{RunAuditError, RunSecurityAuditUseCase};
