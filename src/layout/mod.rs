//! Grid layout detection with confidence arbitration
//!
//! Three strategies each propose at most one layout for a sheet:
//! - text: frame sizes declared in the title or description
//! - vision boundary: separators of transparent or background pixels
//! - heuristic: brute force over canonical frame sizes
//!
//! The detector runs all three and selects one by a fixed priority rule.

/// Separator analysis over background pixels
pub mod boundary;
/// Layout candidates and grid geometry
pub mod candidate;
/// Strategy dispatch and confidence arbitration
pub mod detector;
/// Brute-force search over canonical frame sizes
pub mod heuristic;
/// Frame sizes and counts declared in free text
pub mod text;
