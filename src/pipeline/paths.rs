//! Corpus directory layout

use crate::io::configuration::{
    CANDIDATES_FILE, FRAMES_DIR, LAYOUTS_FILE, METADATA_STORE, PROCESSED_FILE, REVIEW_QUEUE_FILE,
    REVIEW_RENDER_DIR, VALIDATIONS_FILE,
};
use std::path::{Path, PathBuf};

/// Locations of every stage input and output under one corpus root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusPaths {
    /// Corpus root, also the base for relative image paths
    pub root: PathBuf,
    /// Metadata store, a directory of records or a single document
    pub metadata: PathBuf,
    /// Classifier output
    pub candidates: PathBuf,
    /// Layout detector output
    pub layouts: PathBuf,
    /// Validator output
    pub validations: PathBuf,
    /// Review renderings
    pub review_renders: PathBuf,
    /// Extracted frame images
    pub frames: PathBuf,
    /// Processed metadata
    pub processed: PathBuf,
    /// Review queue
    pub review_queue: PathBuf,
}

impl CorpusPaths {
    /// Default layout under `root`
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            metadata: root.join(METADATA_STORE),
            candidates: root.join(CANDIDATES_FILE),
            layouts: root.join(LAYOUTS_FILE),
            validations: root.join(VALIDATIONS_FILE),
            review_renders: root.join(REVIEW_RENDER_DIR),
            frames: root.join(FRAMES_DIR),
            processed: root.join(PROCESSED_FILE),
            review_queue: root.join(REVIEW_QUEUE_FILE),
        }
    }
}
