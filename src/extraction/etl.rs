//! Routing of sheets to extraction or review, and processed records
//!
//! A sheet is extracted if and only if its validation verdict is
//! `validated`. Everything else that has been decided becomes a review item;
//! sheets whose validation has not run yet stay pending.

use crate::extraction::review::ReviewReason;
use crate::extraction::slicer::ExtractedFrame;
use crate::layout::candidate::LayoutCandidate;
use crate::layout::detector::{ConfidenceTier, LayoutRecord};
use crate::validation::validator::{FailureReason, ValidationResult, Verdict};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What the extractor does with one sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    /// Slice frames and record the sheet as processed
    Extract,
    /// Add a review item
    Review(ReviewReason),
    /// Validation has not produced a result yet
    Pending,
}

/// Decide a sheet's route
///
/// `min_confidence` sends accepted layouts below that tier to review before
/// their validation result is consulted.
pub fn route(
    layout: &LayoutRecord,
    validation: Option<&ValidationResult>,
    min_confidence: ConfidenceTier,
) -> Routing {
    if layout.best_layout.is_none() || layout.confidence == ConfidenceTier::Unknown {
        return Routing::Review(ReviewReason::NoLayout);
    }
    if layout.confidence < min_confidence {
        return Routing::Review(ReviewReason::LowConfidence);
    }

    match validation {
        None => Routing::Pending,
        Some(result) => match (result.verdict, result.failure_reason) {
            (Verdict::Validated, _) => Routing::Extract,
            (Verdict::Failed, Some(FailureReason::ValidationUnavailable)) => {
                Routing::Review(ReviewReason::ValidationUnavailable)
            }
            (Verdict::Failed, _) => Routing::Review(ReviewReason::ValidationFailed),
        },
    }
}

/// One extracted frame in the processed metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameEntry {
    /// Row-major frame index
    pub frame: u32,
    /// Grid row
    pub row: u32,
    /// Grid column
    pub col: u32,
    /// Left edge in the sheet
    pub x: u32,
    /// Top edge in the sheet
    pub y: u32,
    /// Written frame image
    pub path: PathBuf,
}

impl From<&ExtractedFrame> for FrameEntry {
    fn from(frame: &ExtractedFrame) -> Self {
        Self {
            frame: frame.index,
            row: frame.row,
            col: frame.col,
            x: frame.x,
            y: frame.y,
            path: frame.output_path.clone(),
        }
    }
}

/// Processed metadata entry linking a sheet to its layout and validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedSheet {
    /// Sheet id
    pub id: String,
    /// Sheet title
    pub title: String,
    /// Image the frames were cut from
    pub source_file: PathBuf,
    /// Layout tier
    pub confidence: ConfidenceTier,
    /// Layout used for slicing
    pub layout: LayoutCandidate,
    /// Validation that admitted the sheet
    pub validation: ValidationResult,
    /// Frames written
    pub frames: Vec<FrameEntry>,
}

impl ProcessedSheet {
    /// Build the record for a sheet whose frames were written
    pub fn new(
        record: &LayoutRecord,
        layout: LayoutCandidate,
        validation: ValidationResult,
        frames: &[ExtractedFrame],
    ) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            source_file: record.file.clone(),
            confidence: record.confidence,
            layout,
            validation,
            frames: frames.iter().map(FrameEntry::from).collect(),
        }
    }
}
