//! Strategy dispatch and confidence arbitration
//!
//! Every strategy runs on every sheet. Arbitration then walks the strategies
//! in priority order and accepts the first candidate meeting that strategy's
//! bar:
//!
//! | strategy        | accepted when         | tier   |
//! |-----------------|-----------------------|--------|
//! | text            | perfect fit           | high   |
//! | vision boundary | waste < 0.05          | medium |
//! | heuristic       | waste < 0.15          | low    |
//!
//! A sheet no candidate qualifies for is `unknown` and carries no layout.

use crate::catalog::record::SheetRecord;
use crate::io::configuration::{HEURISTIC_WASTE_TOLERANCE, VISION_WASTE_TOLERANCE};
use crate::layout::candidate::{DetectionMethod, LayoutCandidate};
use crate::layout::{boundary, heuristic, text};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// How trustworthy a selected layout is
///
/// Ordered from least to most trustworthy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    /// No candidate met its acceptance bar
    #[value(skip)]
    Unknown,
    /// Accepted brute-force fit
    Low,
    /// Accepted separator analysis
    Medium,
    /// Text-declared size that tiles the image exactly
    High,
}

impl ConfidenceTier {
    /// Label used in documents and logs
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DetectionMethod {
    /// Strategies in arbitration priority order
    pub const PRIORITY: [Self; 3] = [Self::Text, Self::VisionBoundary, Self::Heuristic];

    /// Run this strategy on a sheet
    pub fn propose(self, layout_text: &str, sheet: &RgbaImage) -> Option<LayoutCandidate> {
        let (width, height) = sheet.dimensions();
        match self {
            Self::Text => text::propose(layout_text, width, height),
            Self::VisionBoundary => boundary::propose(sheet),
            Self::Heuristic => heuristic::propose(width, height),
        }
    }

    /// Tier granted to a candidate from this strategy, `None` if it falls short
    pub fn accept(self, candidate: &LayoutCandidate) -> Option<ConfidenceTier> {
        let accepted = match self {
            Self::Text => candidate.perfect_fit,
            Self::VisionBoundary => candidate.waste_percentage < VISION_WASTE_TOLERANCE,
            Self::Heuristic => candidate.waste_percentage < HEURISTIC_WASTE_TOLERANCE,
        };
        accepted.then_some(match self {
            Self::Text => ConfidenceTier::High,
            Self::VisionBoundary => ConfidenceTier::Medium,
            Self::Heuristic => ConfidenceTier::Low,
        })
    }
}

/// Outcome of running every strategy on one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutDecision {
    /// Each strategy's proposal, in priority order
    pub candidates: Vec<LayoutCandidate>,
    /// The accepted candidate, absent when the tier is unknown
    pub selected: Option<LayoutCandidate>,
    /// Tier of the accepted candidate
    pub confidence: ConfidenceTier,
}

/// Select one candidate by the fixed priority rule
pub fn arbitrate(candidates: &[LayoutCandidate]) -> (Option<LayoutCandidate>, ConfidenceTier) {
    for method in DetectionMethod::PRIORITY {
        let accepted = candidates
            .iter()
            .filter(|candidate| candidate.method == method)
            .find_map(|candidate| method.accept(candidate).map(|tier| (candidate, tier)));
        if let Some((candidate, tier)) = accepted {
            return (Some(candidate.clone()), tier);
        }
    }
    (None, ConfidenceTier::Unknown)
}

/// Run all strategies on a sheet and arbitrate between them
pub fn detect_layout(layout_text: &str, sheet: &RgbaImage) -> LayoutDecision {
    let candidates: Vec<LayoutCandidate> = DetectionMethod::PRIORITY
        .into_iter()
        .filter_map(|method| method.propose(layout_text, sheet))
        .collect();
    let (selected, confidence) = arbitrate(&candidates);

    LayoutDecision {
        candidates,
        selected,
        confidence,
    }
}

/// Layout detector output entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRecord {
    /// Sheet id
    pub id: String,
    /// Sheet title
    pub title: String,
    /// Image the layout was detected on
    pub file: PathBuf,
    /// Decoded width in pixels
    pub image_width: u32,
    /// Decoded height in pixels
    pub image_height: u32,
    /// Tier of the selected layout
    pub confidence: ConfidenceTier,
    /// Selected layout, absent when the tier is unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_layout: Option<LayoutCandidate>,
    /// Every strategy's proposal, kept for review
    #[serde(default)]
    pub candidates: Vec<LayoutCandidate>,
}

impl LayoutRecord {
    /// Combine a sheet's metadata with its detection outcome
    pub fn new(record: &SheetRecord, file: PathBuf, sheet: &RgbaImage, decision: LayoutDecision) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            file,
            image_width: sheet.width(),
            image_height: sheet.height(),
            confidence: decision.confidence,
            best_layout: decision.selected,
            candidates: decision.candidates,
        }
    }

    /// Best guess for drawing a review overlay
    pub fn best_guess(&self) -> Option<&LayoutCandidate> {
        self.best_layout.as_ref().or_else(|| self.candidates.first())
    }
}
