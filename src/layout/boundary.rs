//! Frame pitch inference from empty separator rows and columns
//!
//! Sheets usually leave transparent (or flat background) margins around each
//! sprite. Runs of fully empty columns then mark the boundaries between
//! frames, and the most common spacing between boundaries is the frame width.
//! Rows give the frame height the same way.

use crate::io::configuration::MIN_BOUNDARY_PITCH;
use crate::layout::candidate::{DetectionMethod, LayoutCandidate};
use bitvec::prelude::*;
use image::RgbaImage;
use ndarray::{Array2, Axis};
use std::collections::BTreeMap;

/// Per-pixel background flags for one sheet, indexed `[y, x]`
#[derive(Debug, Clone)]
pub struct BackgroundMask {
    mask: Array2<bool>,
}

impl BackgroundMask {
    /// Classify every pixel as background or content
    ///
    /// Fully transparent pixels are background. Sheets without any
    /// transparency use the top-left pixel's colour as a flat background.
    pub fn from_image(img: &RgbaImage) -> Self {
        let (width, height) = (img.width() as usize, img.height() as usize);
        let has_transparency = img.pixels().any(|p| p.0[3] == 0);
        let corner = img.get_pixel_checked(0, 0).copied();

        let mut mask = Array2::from_elem((height, width), false);
        for (x, y, pixel) in img.enumerate_pixels() {
            let background = if has_transparency {
                pixel.0[3] == 0
            } else {
                corner == Some(*pixel)
            };
            if let Some(cell) = mask.get_mut((y as usize, x as usize)) {
                *cell = background;
            }
        }

        Self { mask }
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.mask.ncols()
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.mask.nrows()
    }

    /// Columns made only of background pixels
    pub fn empty_columns(&self) -> BitVec {
        self.mask
            .axis_iter(Axis(1))
            .map(|column| column.iter().all(|&bg| bg))
            .collect()
    }

    /// Rows made only of background pixels
    pub fn empty_rows(&self) -> BitVec {
        self.mask
            .axis_iter(Axis(0))
            .map(|row| row.iter().all(|&bg| bg))
            .collect()
    }

    /// Whether a rectangle holds no content; parts outside the sheet count as empty
    pub fn is_region_empty(&self, x: u32, y: u32, width: u32, height: u32) -> bool {
        let x0 = (x as usize).min(self.width());
        let y0 = (y as usize).min(self.height());
        let x1 = (x as usize + width as usize).min(self.width());
        let y1 = (y as usize + height as usize).min(self.height());
        self.mask
            .slice(ndarray::s![y0..y1, x0..x1])
            .iter()
            .all(|&bg| bg)
    }
}

/// Frame boundary positions implied by runs of empty lines
///
/// A run touching the start marks boundary 0, one touching the end marks
/// the full extent, and an interior run marks its midpoint. Both ends of the
/// axis are always boundaries.
pub fn separator_boundaries(empty: &BitSlice) -> Vec<usize> {
    let extent = empty.len();
    let mut boundaries = vec![0];

    let mut index = 0;
    while index < extent {
        if empty.get(index).as_deref() != Some(&true) {
            index += 1;
            continue;
        }
        let start = index;
        while empty.get(index).as_deref() == Some(&true) {
            index += 1;
        }
        let end = index;

        let boundary = if start == 0 {
            0
        } else if end == extent {
            extent
        } else {
            (start + end) / 2
        };
        boundaries.push(boundary);
    }

    boundaries.push(extent);
    boundaries.sort_unstable();
    boundaries.dedup();
    boundaries
}

/// Most common spacing between consecutive boundaries
///
/// Ties go to the smaller spacing.
pub fn dominant_pitch(boundaries: &[usize]) -> Option<u32> {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for pair in boundaries.windows(2) {
        if let [a, b] = pair {
            *counts.entry(b - a).or_default() += 1;
        }
    }

    let mut best: Option<(usize, usize)> = None;
    for (&spacing, &count) in &counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((spacing, count));
        }
    }
    best.and_then(|(spacing, _)| u32::try_from(spacing).ok())
}

/// Snap a measured pitch to one that divides the extent evenly
///
/// Off-by-one midpoints from asymmetric margins are corrected by dividing
/// the extent by the nearest whole frame count. Pitches that cannot be
/// snapped are returned unchanged.
pub const fn refine_pitch(pitch: u32, extent: u32) -> u32 {
    if pitch == 0 || extent % pitch == 0 {
        return pitch;
    }
    let frames = (extent + pitch / 2) / pitch;
    if frames > 0 && extent % frames == 0 {
        extent / frames
    } else {
        pitch
    }
}

/// Index of the last cell holding content, plus one
pub fn used_frame_count(mask: &BackgroundMask, layout: &LayoutCandidate) -> u32 {
    layout
        .cells()
        .filter(|cell| !mask.is_region_empty(cell.x, cell.y, layout.frame_w, layout.frame_h))
        .map(|cell| cell.index + 1)
        .max()
        .unwrap_or(0)
}

/// Propose a layout from separator analysis
///
/// Declines when neither axis has an interior separator, when a pitch is
/// below [`MIN_BOUNDARY_PITCH`], or when the sheet has no content.
pub fn propose(img: &RgbaImage) -> Option<LayoutCandidate> {
    let (image_w, image_h) = img.dimensions();
    let mask = BackgroundMask::from_image(img);

    let pitch_w = dominant_pitch(&separator_boundaries(&mask.empty_columns()))?;
    let pitch_h = dominant_pitch(&separator_boundaries(&mask.empty_rows()))?;
    let frame_w = refine_pitch(pitch_w, image_w);
    let frame_h = refine_pitch(pitch_h, image_h);

    if frame_w == image_w && frame_h == image_h {
        return None;
    }
    if frame_w < MIN_BOUNDARY_PITCH || frame_h < MIN_BOUNDARY_PITCH {
        return None;
    }

    let candidate =
        LayoutCandidate::fit(image_w, image_h, frame_w, frame_h, DetectionMethod::VisionBoundary)?;
    let used = used_frame_count(&mask, &candidate);
    candidate.with_total_frames(used)
}
