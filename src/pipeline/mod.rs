//! Stage runners reading and writing the corpus checkpoints
//!
//! Each stage reads the previous stage's document, processes the sheets it
//! has not processed yet, and rewrites its own document. Per-sheet failures
//! are logged and counted; only an unreadable input document or an
//! unwritable output stops a stage.

/// Classifier stage
pub mod classify;
/// Layout detection stage
pub mod detect;
/// Extraction and review routing stage
pub mod extract;
/// Corpus directory layout
pub mod paths;
/// Stage counters
pub mod summary;
/// Validation stage
pub mod validate;
