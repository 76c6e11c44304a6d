//! Stage counters

use tracing::info;

/// What one stage did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageSummary {
    /// Stage name
    pub stage: &'static str,
    /// Sheets in the stage's input
    pub seen: usize,
    /// Sheets already present in the stage's output
    pub already_done: usize,
    /// New entries written to the stage's output
    pub written: usize,
    /// Sheets dropped because they could not be read
    pub skipped: usize,
    /// Sheets routed to review
    pub reviewed: usize,
    /// Sheets waiting on an earlier stage
    pub pending: usize,
    /// Frame images written
    pub frames: usize,
}

impl StageSummary {
    /// Empty counters for a stage
    pub fn new(stage: &'static str) -> Self {
        Self {
            stage,
            ..Self::default()
        }
    }

    /// Report the counters
    pub fn log(&self) {
        info!(
            stage = self.stage,
            seen = self.seen,
            already_done = self.already_done,
            written = self.written,
            skipped = self.skipped,
            reviewed = self.reviewed,
            pending = self.pending,
            frames = self.frames,
            "stage complete"
        );
    }
}
