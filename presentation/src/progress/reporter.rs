//! Progress reporting for review runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use secreview_application::{ReviewProgressNotifier, ReviewStage};
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress during a review with a spinner or progress bar per stage
pub struct ProgressReporter {
    stage_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            stage_bar: Mutex::new(None),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn stage_display_name(stage: ReviewStage) -> &'static str {
        match stage {
            ReviewStage::Masking => "Masking secrets",
            ReviewStage::Audit => "Security audit",
            ReviewStage::Filtering => "Filtering findings",
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.stage_bar.lock()
            && let Some(pb) = guard.as_ref()
        {
            f(pb);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewProgressNotifier for ProgressReporter {
    fn on_stage_start(&self, stage: ReviewStage, total_items: usize) {
        // Single-item stages get a spinner; the audit call can run for minutes
        let pb = if total_items > 1 {
            let pb = ProgressBar::new(total_items as u64);
            pb.set_style(Self::bar_style());
            pb
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(120));
            pb
        };
        pb.set_prefix(Self::stage_display_name(stage));
        pb.set_message("Starting...");

        if let Ok(mut guard) = self.stage_bar.lock()
            && let Some(previous) = guard.replace(pb)
        {
            previous.finish_and_clear();
        }
    }

    fn on_item_complete(&self, _stage: ReviewStage, label: &str, success: bool) {
        self.with_bar(|pb| {
            let status = if success {
                format!("{} {}", "v".green(), label)
            } else {
                format!("{} {}", "x".red(), label)
            };
            pb.set_message(status);
            pb.inc(1);
        });
    }

    fn on_stage_complete(&self, stage: ReviewStage) {
        if let Ok(mut guard) = self.stage_bar.lock()
            && let Some(pb) = guard.take()
        {
            pb.finish_with_message(format!(
                "{} complete",
                Self::stage_display_name(stage).green()
            ));
        }
    }

    fn on_attempt(&self, attempt: u32, max_attempts: u32) {
        if attempt > 1 {
            self.with_bar(|pb| {
                pb.set_message(format!("retrying (attempt {}/{})", attempt, max_attempts));
            });
        }
    }
}

/// Simple text-based progress for CI logs (no fancy UI)
pub struct SimpleProgress;

impl ReviewProgressNotifier for SimpleProgress {
    fn on_stage_start(&self, stage: ReviewStage, total_items: usize) {
        let name = ProgressReporter::stage_display_name(stage);
        eprintln!("{} {} ({} items)", "->".cyan(), name.bold(), total_items);
    }

    fn on_item_complete(&self, _stage: ReviewStage, label: &str, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), label);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), label);
        }
    }

    fn on_stage_complete(&self, _stage: ReviewStage) {}

    fn on_attempt(&self, attempt: u32, max_attempts: u32) {
        if attempt > 1 {
            eprintln!("  retrying (attempt {}/{})", attempt, max_attempts);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_lifecycle_clears_bar() {
        let reporter = ProgressReporter::new();
        reporter.on_stage_start(ReviewStage::Filtering, 3);
        reporter.on_item_complete(ReviewStage::Filtering, "src/db.rs:42", true);
        reporter.on_item_complete(ReviewStage::Filtering, "src/api.rs", false);
        {
            let guard = reporter.stage_bar.lock().unwrap();
            assert_eq!(guard.as_ref().unwrap().position(), 2);
        }
        reporter.on_stage_complete(ReviewStage::Filtering);
        assert!(reporter.stage_bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_new_stage_replaces_previous() {
        let reporter = ProgressReporter::new();
        reporter.on_stage_start(ReviewStage::Masking, 1);
        reporter.on_stage_start(ReviewStage::Audit, 1);
        reporter.on_attempt(2, 2);
        reporter.on_stage_complete(ReviewStage::Audit);
        assert!(reporter.stage_bar.lock().unwrap().is_none());
    }
}
