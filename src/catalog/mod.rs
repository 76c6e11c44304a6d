//! Metadata store records and candidate classification

/// Keyword classification of sheets into character categories
pub mod classifier;
/// Sheet records supplied by the metadata store
pub mod record;
