//! Deterministic choice of representative frames
//!
//! Validation scores at most four frames per sheet, taken at 0, 1/4, 1/2
//! and 3/4 of the frame count.

use crate::io::configuration::SAMPLE_QUARTERS;

/// Frame indices to score for a sheet with `total_frames` frames
///
/// Indices are floored, clamped to the last frame, and de-duplicated in
/// order. An empty sheet yields no indices.
pub fn sample_frame_indices(total_frames: u32) -> Vec<u32> {
    if total_frames == 0 {
        return Vec::new();
    }

    let mut indices: Vec<u32> = Vec::with_capacity(SAMPLE_QUARTERS.len());
    for quarter in SAMPLE_QUARTERS {
        let position = u64::from(total_frames) * u64::from(quarter) / 4;
        let index = u32::try_from(position)
            .unwrap_or(u32::MAX)
            .min(total_frames - 1);
        if !indices.contains(&index) {
            indices.push(index);
        }
    }
    indices
}
