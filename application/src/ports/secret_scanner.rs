//! Secret scanner port
//!
//! Detects secrets in text (typically a PR diff) so they can be masked
//! before the content is sent to an AI provider.

use async_trait::async_trait;
use secreview_domain::DetectedSecret;
use thiserror::Error;

/// Errors that can occur while scanning
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Scanner not available: {0}")]
    Unavailable(String),

    #[error("Scanner failed: {0}")]
    Failed(String),

    #[error("Scanner timed out after {0}s")]
    Timeout(u64),

    #[error("Could not read scanner report: {0}")]
    InvalidReport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Secret detection backend
#[async_trait]
pub trait SecretScanner: Send + Sync {
    /// Short scanner name for logs
    fn name(&self) -> &str;

    /// Whether the scanner can run on this host
    async fn is_available(&self) -> bool;

    /// Detect secrets in `content`
    async fn scan(&self, content: &str) -> Result<Vec<DetectedSecret>, ScanError>;
}
