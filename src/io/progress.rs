//! Per-stage progress display shared by worker threads

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static STAGE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    let template =
        format!("[{{elapsed_precise}}] {{prefix:>9}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}");
    ProgressStyle::default_bar()
        .template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Coordinates progress display for the pipeline stages
///
/// Each stage gets one bar counting sheets. When disabled, stages receive
/// hidden bars so callers never branch on whether output is shown.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ProgressManager {
    /// Create a progress manager, visible or hidden
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    /// Start a bar for a stage processing `sheet_count` sheets
    pub fn start_stage(&self, stage: &'static str, sheet_count: usize) -> StageProgress {
        if !self.enabled {
            return StageProgress::hidden();
        }

        let bar = ProgressBar::new(sheet_count as u64);
        bar.set_style(STAGE_STYLE.clone());
        bar.set_prefix(stage);
        StageProgress {
            bar: self.multi_progress.add(bar),
        }
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        let _ = self.multi_progress.clear();
    }
}

/// Progress of one stage, cheap to share across worker threads
#[derive(Clone)]
pub struct StageProgress {
    bar: ProgressBar,
}

impl StageProgress {
    /// A bar that never draws
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Record one finished sheet
    pub fn advance(&self) {
        self.bar.inc(1);
    }

    /// Record a batch of finished sheets
    pub fn advance_by(&self, sheets: usize) {
        self.bar.inc(sheets as u64);
    }

    /// Number of sheets recorded so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Mark the stage complete with a closing message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}
