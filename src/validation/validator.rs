//! Per-sheet verdicts from sampled frame scores
//!
//! Each sampled frame is cropped from the sheet and scored against the
//! positive and negative prompts. The sheet's confidence is the worst frame
//! score: every sampled frame has to look correctly framed, not just most
//! of them.

use crate::io::configuration::MAX_SCORE_TIMEOUT_SECS;
use crate::io::error::{PipelineError, Result, invalid_parameter};
use crate::io::image::crop_region;
use crate::layout::candidate::LayoutCandidate;
use crate::validation::sampler::sample_frame_indices;
use crate::validation::scorer::PromptSet;
use crate::validation::service::ScoringService;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Outcome of validating one sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Every sampled frame scored above the threshold
    Validated,
    /// The layout could not be confirmed
    Failed,
}

/// Why a sheet failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Scores were obtained and the worst one did not exceed the threshold
    LowScore,
    /// The scorer could not be loaded, errored or timed out
    ValidationUnavailable,
}

/// Validator output entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Sheet id
    pub sheet_id: String,
    /// Frames chosen for scoring, ascending
    pub sampled_frame_indices: Vec<u32>,
    /// Score of every frame that was scored
    pub per_frame_score: BTreeMap<u32, f64>,
    /// Worst frame score, absent when scoring was unavailable
    pub aggregate_confidence: Option<f64>,
    /// Accept or reject
    pub verdict: Verdict,
    /// Cause of a failed verdict
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<FailureReason>,
    /// Model that produced the scores
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl ValidationResult {
    /// Whether extraction may proceed
    pub fn is_validated(&self) -> bool {
        self.verdict == Verdict::Validated
    }
}

/// Settings shared by every sheet in a run
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Aggregate confidence must exceed this to validate
    pub threshold: f64,
    /// Scoring budget for one sheet
    pub timeout: Duration,
    /// Descriptions scored against each frame
    pub prompts: PromptSet,
}

impl ValidatorConfig {
    /// Build a configuration with the default prompts
    ///
    /// # Errors
    ///
    /// Returns an error if the threshold is not finite or the timeout is
    /// zero or longer than [`MAX_SCORE_TIMEOUT_SECS`]
    pub fn new(threshold: f64, timeout: Duration) -> Result<Self> {
        if !threshold.is_finite() {
            return Err(invalid_parameter("threshold", &threshold, &"must be a finite number"));
        }
        if timeout.is_zero() || timeout.as_secs() > MAX_SCORE_TIMEOUT_SECS {
            return Err(invalid_parameter(
                "score timeout",
                &timeout.as_secs(),
                &format!("must be between 1 and {MAX_SCORE_TIMEOUT_SECS} seconds"),
            ));
        }
        Ok(Self {
            threshold,
            timeout,
            prompts: PromptSet::default(),
        })
    }
}

/// Lowest score across frames, `None` when there are none
pub fn aggregate_confidence(scores: &BTreeMap<u32, f64>) -> Option<f64> {
    scores.values().copied().reduce(f64::min)
}

/// Scores sampled frames through a shared scoring service
pub struct Validator<'a> {
    config: ValidatorConfig,
    service: Option<&'a ScoringService>,
}

impl<'a> Validator<'a> {
    /// Create a validator; without a service every sheet is unavailable
    pub const fn new(config: ValidatorConfig, service: Option<&'a ScoringService>) -> Self {
        Self { config, service }
    }

    /// The run's settings
    pub const fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate one sheet's selected layout
    ///
    /// Never fails: scorer problems become a failed verdict with reason
    /// [`FailureReason::ValidationUnavailable`].
    pub fn validate(
        &self,
        sheet_id: &str,
        sheet: &RgbaImage,
        layout: &LayoutCandidate,
    ) -> ValidationResult {
        let sampled = sample_frame_indices(layout.total_frames);
        let mut per_frame_score = BTreeMap::new();
        let model_version = self.service.map(|s| s.model_version().to_string());

        let outcome = self.score_frames(sheet, layout, &sampled, &mut per_frame_score);

        let (aggregate, verdict, failure_reason) = match outcome {
            Ok(()) => {
                let aggregate = aggregate_confidence(&per_frame_score);
                if aggregate.is_some_and(|score| score > self.config.threshold) {
                    (aggregate, Verdict::Validated, None)
                } else {
                    (aggregate, Verdict::Failed, Some(FailureReason::LowScore))
                }
            }
            Err(error) => {
                debug!(sheet = sheet_id, %error, "scoring unavailable");
                (None, Verdict::Failed, Some(FailureReason::ValidationUnavailable))
            }
        };

        ValidationResult {
            sheet_id: sheet_id.to_string(),
            sampled_frame_indices: sampled,
            per_frame_score,
            aggregate_confidence: aggregate,
            verdict,
            failure_reason,
            model_version,
        }
    }

    fn score_frames(
        &self,
        sheet: &RgbaImage,
        layout: &LayoutCandidate,
        sampled: &[u32],
        per_frame_score: &mut BTreeMap<u32, f64>,
    ) -> Result<()> {
        let service = self.service.ok_or_else(|| PipelineError::ScoringUnavailable {
            reason: "no scoring model loaded".to_string(),
        })?;
        let prompts = self.config.prompts.all();
        let deadline = Instant::now() + self.config.timeout;

        for &index in sampled {
            let cell = layout.cell(index).ok_or_else(|| PipelineError::InvalidSourceData {
                reason: format!("frame {index} is outside the layout"),
            })?;
            let crop = crop_region(sheet, cell.x, cell.y, layout.frame_w, layout.frame_h);
            let similarities = service.score(crop, prompts.clone(), deadline, self.config.timeout)?;
            let score = self
                .config
                .prompts
                .frame_score(&similarities)
                .ok_or_else(|| PipelineError::Scoring {
                    reason: format!(
                        "expected {} similarities, got {}",
                        prompts.len(),
                        similarities.len()
                    ),
                })?;
            per_frame_score.insert(index, score);
        }

        Ok(())
    }
}
