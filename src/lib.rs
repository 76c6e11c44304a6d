//! Sprite sheet pipeline: find animated character sheets in a catalog, detect
//! their frame grids, check sampled frames against a vision-language model and
//! slice the trustworthy ones into individual frames
//!
//! Every stage reads the previous stage's JSON document and writes its own, so
//! stages can run separately and resume after interruption. Sheets that fail
//! any check are queued for manual review rather than guessed at.

#![deny(unsafe_code)]

/// Metadata records and the character sheet classifier
pub mod catalog;
/// Frame slicing, processed metadata and the review queue
pub mod extraction;
/// Input/output operations, configuration and error handling
pub mod io;
/// Grid layout candidates and the three detection strategies
pub mod layout;
/// Stage runners and corpus layout
pub mod pipeline;
/// Frame sampling, scoring and verdicts
pub mod validation;

pub use io::error::{PipelineError, Result};
