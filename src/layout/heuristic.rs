//! Brute-force fit over canonical frame sizes

use crate::io::configuration::CANONICAL_FRAME_SIZES;
use crate::layout::candidate::{DetectionMethod, LayoutCandidate};

/// Every canonical `(width, height)` pair, squares and non-squares alike
pub fn canonical_sizes() -> impl Iterator<Item = (u32, u32)> {
    CANONICAL_FRAME_SIZES
        .into_iter()
        .flat_map(|w| CANONICAL_FRAME_SIZES.into_iter().map(move |h| (w, h)))
}

/// Propose the canonical size leaving the least of the image uncovered
///
/// Equal coverage prefers the larger frame, then the wider one, so a sheet
/// that tiles at 8x8 and at 32x32 is read as 32x32.
pub fn propose(image_w: u32, image_h: u32) -> Option<LayoutCandidate> {
    canonical_sizes()
        .filter_map(|(w, h)| LayoutCandidate::fit(image_w, image_h, w, h, DetectionMethod::Heuristic))
        .filter(|candidate| candidate.total_frames >= 1)
        .max_by_key(|candidate| {
            (
                candidate.used_area(),
                u64::from(candidate.frame_w) * u64::from(candidate.frame_h),
                candidate.frame_w,
            )
        })
}
