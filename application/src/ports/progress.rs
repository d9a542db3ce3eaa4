//! Progress notification port
//!
//! Defines the interface for reporting progress during a review.

/// Stage of a review run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStage {
    /// Secret masking of the diff
    Masking,
    /// Main security audit call
    Audit,
    /// Per-finding false-positive analysis
    Filtering,
}

impl ReviewStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStage::Masking => "masking",
            ReviewStage::Audit => "audit",
            ReviewStage::Filtering => "filtering",
        }
    }
}

/// Callback for progress updates during a review
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console spinner, CI log lines, etc.)
pub trait ReviewProgressNotifier: Send + Sync {
    /// Called when a stage starts
    fn on_stage_start(&self, stage: ReviewStage, total_items: usize);

    /// Called when one item of a stage finishes (an audit attempt, a finding)
    fn on_item_complete(&self, stage: ReviewStage, label: &str, success: bool);

    /// Called when a stage completes
    fn on_stage_complete(&self, stage: ReviewStage);

    /// Called before each outer audit attempt
    fn on_attempt(&self, _attempt: u32, _max_attempts: u32) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ReviewProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: ReviewStage, _total_items: usize) {}
    fn on_item_complete(&self, _stage: ReviewStage, _label: &str, _success: bool) {}
    fn on_stage_complete(&self, _stage: ReviewStage) {}
}
