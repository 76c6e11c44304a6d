//! Review queue entries and their overlay renderings

use crate::extraction::slicer::file_stem;
use crate::io::error::Result;
use crate::io::image::{load_sheet, render_grid_overlay, save_png};
use crate::layout::candidate::LayoutCandidate;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Why a sheet needs a human
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewReason {
    /// No layout candidate met its acceptance bar
    NoLayout,
    /// A layout was found but its tier is below the extraction minimum
    LowConfidence,
    /// Sampled frames did not score above the threshold
    ValidationFailed,
    /// The layout could not be checked
    ValidationUnavailable,
}

impl ReviewReason {
    /// Label used in documents and logs
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoLayout => "no_layout",
            Self::LowConfidence => "low_confidence",
            Self::ValidationFailed => "validation_failed",
            Self::ValidationUnavailable => "validation_unavailable",
        }
    }
}

impl fmt::Display for ReviewReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review queue entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    /// Sheet id
    pub sheet_id: String,
    /// Sheet title
    pub title: String,
    /// Cause
    pub reason: ReviewReason,
    /// Rendering to inspect, the sheet with its best-guess grid
    pub reference_path: PathBuf,
}

/// Where a sheet's review rendering lives
pub fn render_path(render_dir: &Path, sheet_id: &str) -> PathBuf {
    render_dir.join(format!("{}.png", file_stem(sheet_id)))
}

/// Write a sheet with its best-guess grid drawn over it
///
/// # Errors
///
/// Returns an error if the rendering cannot be written
pub fn render_review(
    sheet: &RgbaImage,
    layout: Option<&LayoutCandidate>,
    output: &Path,
) -> Result<()> {
    save_png(&render_grid_overlay(sheet, layout), output)
}

/// Reuse an existing rendering or create it from the sheet file
///
/// # Errors
///
/// Returns an error if a missing rendering cannot be created because the
/// sheet cannot be decoded or the rendering cannot be written
pub fn ensure_review_render(
    sheet_path: &Path,
    layout: Option<&LayoutCandidate>,
    output: &Path,
) -> Result<PathBuf> {
    if !output.exists() {
        let sheet = load_sheet(sheet_path)?;
        render_review(&sheet, layout, output)?;
    }
    Ok(output.to_path_buf())
}
