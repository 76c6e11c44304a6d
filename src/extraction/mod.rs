//! Confidence-gated frame extraction and review routing

/// Routing of sheets to extraction or review, and processed records
pub mod etl;
/// Review queue entries and their overlay renderings
pub mod review;
/// Slicing a validated sheet into frame images
pub mod slicer;
